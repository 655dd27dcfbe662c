use beacon_dashboard::{
    build_ticket_detail, update_item_section, AlertIndicator, AlertLevel, ClientPreferences,
    DashboardDocument, DashboardSnapshot, DisplayZone, RowRenderContext, SectionId, SortDirection,
    SortState, ThemeMode, TicketId, TicketItem,
};
use serde_json::json;

use super::{
    render_beacon_dashboard_page, render_beacon_dashboard_shell,
    render_beacon_dashboard_shell_with_context, BeaconDashboardShellContext,
    BEACON_SORTABLE_COLUMNS,
};

fn utc_context() -> RowRenderContext {
    RowRenderContext {
        ticket_url_template: Some("https://helpdesk.example.com/tickets/{id}".to_string()),
        zone: DisplayZone::utc(),
    }
}

fn sample_snapshot() -> DashboardSnapshot {
    serde_json::from_value(json!({
        "total_active_items": 2,
        "agent_mapping": {"7": "Dana", "12": "Lee"},
        "s1_items": [
            {
                "id": 101,
                "subject": "Printer <b>on fire</b>",
                "requester_name": "Ari",
                "agent_name": "Dana",
                "priority_text": "Urgent",
                "sla_text": "Overdue",
                "sla_class": "sla-overdue",
                "created_at_str": "2024-03-01T09:30:00Z",
                "updated_at_str": "2024-03-02T10:00:00Z",
                "description_text": "<p>Smoke &amp; sparks</p>"
            }
        ],
        "s2_items": [],
        "s3_items": [],
        "s4_items": [
            {"id": "202", "subject": "VPN access", "priority_text": "Low"}
        ]
    }))
    .expect("snapshot")
}

fn rendered_document(snapshot: &DashboardSnapshot) -> DashboardDocument {
    let mut document = DashboardDocument::new("TheBeacon");
    document
        .agent_filter
        .reconcile(snapshot.agent_mapping.as_ref());
    for section in SectionId::ALL {
        let items: Vec<TicketItem> = snapshot.items(section).to_vec();
        update_item_section(
            &mut document,
            section,
            &items,
            &SortState::default(),
            &utc_context(),
        );
    }
    document.apply_section_titles(snapshot);
    document
}

#[test]
fn unit_default_shell_renders_all_section_scaffolding() {
    let html = render_beacon_dashboard_shell(&DashboardDocument::default());
    assert!(html.contains("id=\"beacon-shell\""));
    assert!(html.contains("data-theme=\"light\""));
    assert!(html.contains("data-sidebar-state=\"expanded\""));
    for section in SectionId::ALL {
        let prefix = section.as_str();
        assert!(html.contains(&format!("id=\"{prefix}-item-table\"")));
        assert!(html.contains(&format!("id=\"{prefix}-items-body\"")));
        assert!(html.contains(&format!("id=\"{prefix}-item-count\"")));
        assert!(html.contains(&format!("id=\"{prefix}-no-items-message\"")));
    }
    assert!(html.contains("id=\"api-error-banner\""));
    assert!(html.contains("id=\"ticket-modal\""));
}

#[test]
fn unit_every_section_exposes_sortable_headers() {
    let html = render_beacon_dashboard_shell(&DashboardDocument::default());
    for (key, _) in BEACON_SORTABLE_COLUMNS {
        let marker = format!("data-sort-key=\"{key}\"");
        assert_eq!(html.matches(marker.as_str()).count(), 4, "header {key}");
    }
}

#[test]
fn functional_rows_are_injected_into_section_bodies() {
    let snapshot = sample_snapshot();
    let html = render_beacon_dashboard_shell(&rendered_document(&snapshot));
    assert!(html.contains("href=\"https://helpdesk.example.com/tickets/101\""));
    assert!(html.contains("data-item-id=\"101\""));
    assert!(html.contains("Printer &lt;b&gt;on fire&lt;/b&gt;"));
    assert!(!html.contains("<b>on fire</b>"));
    assert!(html.contains("priority-badge--urgent"));
    assert!(html.contains("data-item-id=\"202\""));
}

#[test]
fn functional_empty_sections_hide_their_whole_section_and_show_message() {
    let snapshot = sample_snapshot();
    let document = rendered_document(&snapshot);
    assert!(document.section(SectionId::S2).wrapper_hidden);
    let html = render_beacon_dashboard_shell(&document);
    assert!(html.contains("data-section=\"s2\""));
    assert!(html.contains("data-item-count=\"0\""));
    assert!(html.contains("data-item-count=\"1\""));
    assert!(html.contains("<section id=\"s2-section\" style=\"display: none;\""));
    assert_eq!(html.matches("-section\" style=\"display: none;\"").count(), 2);
    assert!(html.contains("No tickets in this section."));
}

#[test]
fn functional_sort_indicator_marks_only_active_header() {
    let snapshot = sample_snapshot();
    let mut document = rendered_document(&snapshot);
    let sort = SortState {
        key: Some("subject".to_string()),
        direction: SortDirection::Desc,
    };
    let items = snapshot.items(SectionId::S1).to_vec();
    update_item_section(&mut document, SectionId::S1, &items, &sort, &utc_context());
    let html = render_beacon_dashboard_shell(&document);
    assert_eq!(html.matches("sortable-header sort-desc").count(), 1);
    assert!(!html.contains("sort-asc"));
    assert!(html.contains("data-sort-direction=\"desc\""));
}

#[test]
fn functional_alert_indicator_carries_level_class_and_sirens() {
    let mut document = DashboardDocument::default();
    document.alert = Some(AlertIndicator::new(115, AlertLevel::Emergency));
    let html = render_beacon_dashboard_shell(&document);
    assert!(html.contains("class=\"total-count count-emergency\""));
    assert!(html.contains("data-alert-level=\"emergency\""));
    assert!(html.contains("data-siren-active=\"true\""));
    assert!(html.contains(">115<"));
}

#[test]
fn functional_normal_alert_level_has_no_level_class() {
    let mut document = DashboardDocument::default();
    document.alert = Some(AlertIndicator::new(75, AlertLevel::Normal));
    let html = render_beacon_dashboard_shell(&document);
    assert!(html.contains("class=\"total-count\""));
    assert!(html.contains("data-siren-active=\"false\""));
}

#[test]
fn functional_agent_filter_lists_all_agents_then_mapping() {
    let snapshot = sample_snapshot();
    let mut document = rendered_document(&snapshot);
    document.agent_filter.select(Some("12".to_string()));
    let html = render_beacon_dashboard_shell(&document);
    assert!(html.contains("All Agents"));
    assert!(html.contains("value=\"7\""));
    assert!(html.contains("value=\"12\""));
    assert!(html.contains("data-selected-agent=\"12\""));
    let seven = html.find("value=\"7\"").expect("agent 7");
    let twelve = html.find("value=\"12\"").expect("agent 12");
    assert!(seven < twelve);
}

#[test]
fn functional_banner_text_is_escaped_and_visible() {
    let mut document = DashboardDocument::default();
    document.banner = Some("Backend <down>".to_string());
    let html = render_beacon_dashboard_shell(&document);
    assert!(html.contains("Backend &lt;down&gt;"));
    assert!(html.contains("role=\"alert\" aria-hidden=\"false\""));
}

#[test]
fn functional_ticket_detail_modal_renders_rows_and_plain_description() {
    let snapshot = sample_snapshot();
    let mut document = rendered_document(&snapshot);
    document.ticket_detail = build_ticket_detail(
        &snapshot,
        SectionId::S1,
        &TicketId::new("101"),
        DisplayZone::utc(),
    );
    let html = render_beacon_dashboard_shell(&document);
    assert!(html.contains("aria-modal=\"true\""));
    assert!(html.contains("data-section-prefix=\"s1\""));
    assert!(html.contains("data-detail-label=\"Requester\""));
    assert!(html.contains("data-detail-label=\"Last Updated\""));
    assert!(html.contains("Smoke &amp; sparks"));
    assert!(!html.contains("<p>Smoke"));
}

#[test]
fn functional_preferences_drive_theme_and_sidebar_attributes() {
    let preferences = ClientPreferences {
        theme: ThemeMode::Dark,
        color_theme: Some("matrix".to_string()),
        sidebar_collapsed: true,
        ..ClientPreferences::default()
    };
    let html = render_beacon_dashboard_shell_with_context(BeaconDashboardShellContext::new(
        &DashboardDocument::default(),
        &preferences,
    ));
    assert!(html.contains("data-theme=\"dark\""));
    assert!(html.contains("data-theme-target=\"light\""));
    assert!(html.contains("data-color-theme=\"matrix\""));
    assert!(html.contains("data-sidebar-state=\"collapsed\""));
    assert!(html.contains("aria-expanded=\"false\""));
}

#[test]
fn integration_page_wraps_shell_with_title_and_reload_meta() {
    let context = BeaconDashboardShellContext::new(
        &DashboardDocument::new("Beacon & Co"),
        &ClientPreferences::default(),
    )
    .with_auto_reload_seconds(Some(60));
    let page = render_beacon_dashboard_page(context);
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains("<title>Beacon &amp; Co</title>"));
    assert!(page.contains("<meta http-equiv=\"refresh\" content=\"60\">"));
    assert!(page.contains("id=\"beacon-shell\""));
}

#[test]
fn regression_zero_reload_interval_omits_meta_refresh() {
    let context = BeaconDashboardShellContext::default().with_auto_reload_seconds(Some(0));
    let page = render_beacon_dashboard_page(context);
    assert!(!page.contains("http-equiv"));
}
