use std::io::Write;

use beacon_dashboard::{AlertTransition, CelebrationKind, TicketId};
use beacon_runtime::{DashboardSignals, TracingSignals};

/// Logs every cue and optionally rings the terminal bell for the audible ones.
pub(crate) struct TerminalSignals {
    inner: TracingSignals,
    bell: bool,
}

impl TerminalSignals {
    pub(crate) fn new(bell: bool) -> Self {
        Self {
            inner: TracingSignals,
            bell,
        }
    }

    fn ring(&self) {
        if !self.bell {
            return;
        }
        let mut stderr = std::io::stderr();
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
    }
}

impl DashboardSignals for TerminalSignals {
    fn new_tickets_arrived(&self, ids: &[TicketId]) {
        self.inner.new_tickets_arrived(ids);
        self.ring();
    }

    fn celebrate(&self, kind: CelebrationKind) {
        self.inner.celebrate(kind);
    }

    fn alert_level_changed(&self, transition: &AlertTransition) {
        self.inner.alert_level_changed(transition);
        if transition.siren_active {
            self.ring();
        }
    }
}
