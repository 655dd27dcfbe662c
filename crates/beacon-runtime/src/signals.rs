use anyhow::Result;
use beacon_dashboard::{
    AlertTransition, CelebrationKind, ClientPreferences, DashboardDocument, TicketId,
};

/// Cue hooks fired by the refresh controller. Cosmetic layers subscribe here.
pub trait DashboardSignals: Send + Sync {
    /// Fired at most once per cycle with every id new to section one.
    fn new_tickets_arrived(&self, ids: &[TicketId]);

    fn celebrate(&self, kind: CelebrationKind);

    fn alert_level_changed(&self, transition: &AlertTransition);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSignals;

impl DashboardSignals for TracingSignals {
    fn new_tickets_arrived(&self, ids: &[TicketId]) {
        let ids = ids.iter().map(TicketId::as_str).collect::<Vec<_>>();
        tracing::info!(count = ids.len(), ids = ?ids, "new tickets arrived");
    }

    fn celebrate(&self, kind: CelebrationKind) {
        tracing::info!(kind = kind.as_str(), "active ticket count dropped below threshold");
    }

    fn alert_level_changed(&self, transition: &AlertTransition) {
        tracing::info!(
            from = transition.previous_level.map(|level| level.as_str()),
            to = transition.level.as_str(),
            siren = transition.siren_active,
            "alert level changed"
        );
    }
}

/// Sink for the rendered document, called after every render pass.
pub trait DashboardPublisher: Send + Sync {
    fn publish(&self, document: &DashboardDocument, preferences: &ClientPreferences) -> Result<()>;
}
