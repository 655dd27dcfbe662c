use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use beacon_client::{BeaconApiClient, BeaconApiError, ForceRefreshResponse, TicketFeed};
use beacon_dashboard::{
    AlertTransition, CelebrationKind, ClientPreferences, ClientPreferencesStore, DashboardAction,
    DashboardDocument, DashboardSnapshot, DisplayZone, SectionId, TicketId,
};
use beacon_dashboard_ui::{render_beacon_dashboard_page, BeaconDashboardShellContext};
use beacon_runtime::{
    run_dashboard_loop, BeaconDashboardConfig, DashboardController, DashboardPublisher,
    DashboardSignals, PollLoopOptions,
};
use httpmock::prelude::*;
use serde_json::{json, Value};
use tokio::sync::{mpsc, Mutex as AsyncMutex};

struct ScriptedFeed {
    snapshots: AsyncMutex<VecDeque<Value>>,
}

impl ScriptedFeed {
    fn new(snapshots: Vec<Value>) -> Self {
        Self {
            snapshots: AsyncMutex::new(VecDeque::from(snapshots)),
        }
    }
}

#[async_trait]
impl TicketFeed for ScriptedFeed {
    async fn fetch_tickets(
        &self,
        _ticket_type_slug: &str,
        _agent_id: Option<&str>,
    ) -> Result<DashboardSnapshot, BeaconApiError> {
        let next = self
            .snapshots
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| json!({"error": "scripted snapshot queue exhausted"}));
        Ok(serde_json::from_value(next).expect("scripted snapshot should decode"))
    }

    async fn force_refresh(&self) -> Result<ForceRefreshResponse, BeaconApiError> {
        Ok(ForceRefreshResponse::default())
    }
}

#[derive(Default)]
struct RecordingSignals {
    new_tickets: Mutex<Vec<TicketId>>,
    celebrations: Mutex<Vec<CelebrationKind>>,
}

impl DashboardSignals for RecordingSignals {
    fn new_tickets_arrived(&self, ids: &[TicketId]) {
        self.new_tickets
            .lock()
            .expect("new tickets lock")
            .extend_from_slice(ids);
    }

    fn celebrate(&self, kind: CelebrationKind) {
        self.celebrations
            .lock()
            .expect("celebrations lock")
            .push(kind);
    }

    fn alert_level_changed(&self, _transition: &AlertTransition) {}
}

#[derive(Default)]
struct PagePublisher {
    pages: Mutex<Vec<String>>,
    documents: Mutex<Vec<DashboardDocument>>,
}

impl PagePublisher {
    fn pages(&self) -> Vec<String> {
        self.pages.lock().expect("pages lock").clone()
    }

    fn last_document(&self) -> DashboardDocument {
        self.documents
            .lock()
            .expect("documents lock")
            .last()
            .cloned()
            .expect("at least one published document")
    }
}

impl DashboardPublisher for PagePublisher {
    fn publish(
        &self,
        document: &DashboardDocument,
        preferences: &ClientPreferences,
    ) -> anyhow::Result<()> {
        let page =
            render_beacon_dashboard_page(BeaconDashboardShellContext::new(document, preferences));
        self.pages.lock().expect("pages lock").push(page);
        self.documents
            .lock()
            .expect("documents lock")
            .push(document.clone());
        Ok(())
    }
}

fn snapshot_with_subjects(total: u64, subjects: &[(u64, &str)]) -> Value {
    let s1_items = subjects
        .iter()
        .map(|(id, subject)| json!({"id": id, "subject": subject, "priority_text": "Medium"}))
        .collect::<Vec<_>>();
    json!({
        "total_active_items": total,
        "s1_items": s1_items,
        "s2_items": [],
        "s3_items": [],
        "s4_items": []
    })
}

fn controller_for(feed: Arc<dyn TicketFeed>, signals: Arc<RecordingSignals>) -> DashboardController {
    let config = BeaconDashboardConfig {
        auto_refresh_ms: 0,
        ..BeaconDashboardConfig::default()
    };
    DashboardController::new(
        &config,
        feed,
        signals,
        ClientPreferencesStore::in_memory(ClientPreferences::default()),
    )
    .with_display_zone(DisplayZone::utc())
}

#[tokio::test]
async fn integration_sort_persists_across_refresh_and_cues_fire_once() {
    let feed = Arc::new(ScriptedFeed::new(vec![
        snapshot_with_subjects(60, &[(1, "Alpha"), (2, "charlie"), (3, "Bravo")]),
        snapshot_with_subjects(
            40,
            &[(1, "Alpha"), (2, "charlie"), (3, "Bravo"), (4, "<img src=x onerror=alert(1)>")],
        ),
    ]));
    let signals = Arc::new(RecordingSignals::default());
    let mut controller = controller_for(feed, signals.clone());
    let publisher = PagePublisher::default();

    let (sender, receiver) = mpsc::channel(8);
    for action in [
        DashboardAction::SortColumn {
            section: SectionId::S1,
            key: "subject".to_string(),
        },
        DashboardAction::SortColumn {
            section: SectionId::S1,
            key: "subject".to_string(),
        },
        DashboardAction::Refresh,
    ] {
        sender.send(action).await.expect("queue action");
    }
    drop(sender);

    let report = run_dashboard_loop(
        &mut controller,
        &publisher,
        receiver,
        PollLoopOptions {
            poll_interval: None,
            run_once: false,
        },
    )
    .await
    .expect("dashboard loop");

    assert_eq!(report.cycles, 2);
    assert_eq!(report.failed_cycles, 0);
    assert_eq!(report.actions_handled, 3);
    assert_eq!(publisher.pages().len(), 4);

    let document = publisher.last_document();
    assert_eq!(
        document.section(SectionId::S1).row_ids(),
        vec!["2", "3", "1", "4"]
    );
    assert_eq!(
        signals.new_tickets.lock().expect("new tickets lock").clone(),
        vec![TicketId::new("4")]
    );
    assert_eq!(
        signals.celebrations.lock().expect("celebrations lock").clone(),
        vec![CelebrationKind::Calm]
    );

    let page = publisher.pages().pop().expect("last page");
    assert!(page.contains("class=\"sortable-header sort-desc\" data-sort-key=\"subject\""));
    assert!(page.contains("&lt;img src=x onerror=alert(1)&gt;"));
    assert!(!page.contains("<img src=x"));
    assert!(page.contains("class=\"total-count count-calm\""));
}

#[tokio::test]
async fn integration_force_refresh_against_backend_refetches_and_reports_status() {
    let server = MockServer::start();
    let tickets = server.mock(|when, then| {
        when.method(GET).path("/api/tickets/helpdesk");
        then.status(200)
            .json_body(snapshot_with_subjects(2, &[(7, "Disk full"), (8, "Reset MFA")]));
    });
    let refresh = server.mock(|when, then| {
        when.method(POST).path("/api/refresh");
        then.status(200)
            .json_body(json!({"success": true, "ticket_count": 2}));
    });
    let client = BeaconApiClient::new(server.base_url(), 2_000, 1, 0).expect("client");
    let signals = Arc::new(RecordingSignals::default());
    let mut controller = controller_for(Arc::new(client), signals);
    let publisher = PagePublisher::default();

    let (sender, receiver) = mpsc::channel(4);
    sender
        .send(DashboardAction::ForceRefresh)
        .await
        .expect("queue force refresh");
    drop(sender);

    let report = run_dashboard_loop(
        &mut controller,
        &publisher,
        receiver,
        PollLoopOptions {
            poll_interval: None,
            run_once: false,
        },
    )
    .await
    .expect("dashboard loop");

    assert_eq!(report.cycles, 2);
    assert_eq!(tickets.calls(), 2);
    assert_eq!(refresh.calls(), 1);
    let document = publisher.last_document();
    assert_eq!(
        document.refresh_status.as_deref(),
        Some("Refreshed (2 tickets)")
    );
    assert_eq!(document.section(SectionId::S1).item_count, 2);
    assert!(document.banner.is_none());
}
