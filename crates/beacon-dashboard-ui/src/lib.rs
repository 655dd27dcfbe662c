//! Leptos SSR rendering of the Beacon helpdesk dashboard page.

use beacon_dashboard::{
    escape_html, ClientPreferences, DashboardDocument, SectionId, SectionView, SortState,
    TicketDetailView,
};
use leptos::prelude::*;

#[cfg(test)]
mod tests;

const HIDDEN_STYLE: &str = "display: none;";

/// Sortable columns in display order: wire key, header label.
pub const BEACON_SORTABLE_COLUMNS: [(&str, &str); 8] = [
    ("id", "ID"),
    ("subject", "Subject"),
    ("requester_name", "Requester"),
    ("agent_name", "Agent"),
    ("priority_text", "Priority"),
    ("sla_text", "SLA Status"),
    ("updated_at_str", "Last Updated"),
    ("created_at_str", "Age"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
/// Everything one page render needs. Owned so the render can run off a snapshot.
pub struct BeaconDashboardShellContext {
    pub document: DashboardDocument,
    pub preferences: ClientPreferences,
    /// Browser reload interval written into the page head; `None` omits it.
    pub auto_reload_seconds: Option<u64>,
}

impl Default for BeaconDashboardShellContext {
    fn default() -> Self {
        Self {
            document: DashboardDocument::default(),
            preferences: ClientPreferences::default(),
            auto_reload_seconds: None,
        }
    }
}

impl BeaconDashboardShellContext {
    pub fn new(document: &DashboardDocument, preferences: &ClientPreferences) -> Self {
        Self {
            document: document.clone(),
            preferences: preferences.clone(),
            auto_reload_seconds: None,
        }
    }

    pub fn with_auto_reload_seconds(mut self, seconds: Option<u64>) -> Self {
        self.auto_reload_seconds = seconds.filter(|seconds| *seconds > 0);
        self
    }
}

fn bool_attr(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

fn visibility_style(visible: bool) -> &'static str {
    if visible {
        ""
    } else {
        HIDDEN_STYLE
    }
}

fn sortable_header_class(sort: &SortState, key: &str) -> String {
    match sort.indicator_for(key) {
        Some(indicator) => format!("sortable-header {indicator}"),
        None => "sortable-header".to_string(),
    }
}

fn total_count_class(document: &DashboardDocument) -> String {
    match document.alert.as_ref().and_then(|alert| alert.css_class()) {
        Some(level_class) => format!("total-count {level_class}"),
        None => "total-count".to_string(),
    }
}

fn render_section(section_view: &SectionView) -> impl IntoView {
    let prefix = section_view.section.as_str();
    let section_id = format!("{prefix}-section");
    let table_id = format!("{prefix}-item-table");
    let count_id = format!("{prefix}-item-count");
    let body_id = format!("{prefix}-items-body");
    let empty_id = format!("{prefix}-no-items-message");
    let section_style = visibility_style(!section_view.wrapper_hidden);
    let empty_style = visibility_style(section_view.empty_message_visible);
    let empty_hidden = bool_attr(!section_view.empty_message_visible);
    let item_count_value = section_view.item_count.to_string();
    let sort_key_value = section_view.sort.key.clone().unwrap_or_default();
    let sort_direction_value = section_view.sort.direction.as_str();
    let rows_html = section_view.rows_html();
    let headers = BEACON_SORTABLE_COLUMNS
        .iter()
        .map(|(key, label)| {
            let header_class = sortable_header_class(&section_view.sort, key);
            view! {
                <th scope="col" class=header_class data-sort-key=*key>
                    {*label}
                </th>
            }
        })
        .collect_view();

    view! {
        <section
            id=section_id
            style=section_style
            class="item-section"
            data-section=prefix
            data-item-count=item_count_value
        >
            <h2 class="item-section__title">
                {section_view.title.clone()}
                <span id=count_id class="item-count">{section_view.item_count}</span>
            </h2>
            <p
                id=empty_id
                class="no-items-message"
                aria-hidden=empty_hidden
                style=empty_style
            >
                No tickets in this section.
            </p>
            <div class="table-wrapper">
                <table
                    id=table_id
                    class="data-table"
                    data-sort-key=sort_key_value
                    data-sort-direction=sort_direction_value
                >
                    <thead>
                        <tr>{headers}</tr>
                    </thead>
                    <tbody id=body_id inner_html=rows_html></tbody>
                </table>
            </div>
        </section>
    }
}

fn render_ticket_modal(detail: Option<&TicketDetailView>) -> impl IntoView {
    let open = detail.is_some();
    let modal_hidden = bool_attr(!open);
    let modal_style = visibility_style(open);
    let title = detail
        .map(|detail| detail.title.clone())
        .unwrap_or_default();
    let item_id_value = detail
        .map(|detail| detail.item_id.as_str().to_string())
        .unwrap_or_default();
    let section_value = detail
        .map(|detail| detail.section.as_str())
        .unwrap_or_default();
    let description = detail
        .map(|detail| detail.description.clone())
        .unwrap_or_default();
    let rows = detail.map(|detail| detail.rows.clone()).unwrap_or_default();

    view! {
        <div
            id="ticket-modal"
            class="modal"
            role="dialog"
            aria-modal="true"
            aria-labelledby="modal-title"
            aria-hidden=modal_hidden
            style=modal_style
            data-item-id=item_id_value
            data-section-prefix=section_value
        >
            <div class="modal__content">
                <button class="modal__close" type="button" aria-label="Close">
                    "×"
                </button>
                <h2 id="modal-title">{title}</h2>
                <div id="modal-details-grid" class="modal__details">
                    {rows
                        .into_iter()
                        .map(|row| {
                            view! {
                                <div class="modal__detail-row" data-detail-label=row.label>
                                    <span class="modal__detail-label">{row.label}</span>
                                    <span class="modal__detail-value" inner_html=row.value_html></span>
                                </div>
                            }
                        })
                        .collect_view()}
                </div>
                <div id="modal-description" class="modal__description">{description}</div>
            </div>
        </div>
    }
}

/// Renders the dashboard shell with default preferences.
pub fn render_beacon_dashboard_shell(document: &DashboardDocument) -> String {
    render_beacon_dashboard_shell_with_context(BeaconDashboardShellContext::new(
        document,
        &ClientPreferences::default(),
    ))
}

/// Renders the dashboard shell (everything inside `<body>`).
pub fn render_beacon_dashboard_shell_with_context(context: BeaconDashboardShellContext) -> String {
    let document = &context.document;
    let theme_attr = context.preferences.theme.as_str();
    let theme_toggle_target = context.preferences.theme.toggled().as_str();
    let color_theme_attr = context
        .preferences
        .color_theme
        .clone()
        .unwrap_or_else(|| "default".to_string());
    let sidebar_state_attr = if context.preferences.sidebar_collapsed {
        "collapsed"
    } else {
        "expanded"
    };
    let sidebar_expanded = bool_attr(!context.preferences.sidebar_collapsed);
    let view_name = document.view_name.clone().unwrap_or_default();

    let banner_visible = document.banner.is_some();
    let banner_style = visibility_style(banner_visible);
    let banner_hidden = bool_attr(!banner_visible);
    let banner_message = document.banner.clone().unwrap_or_default();

    let refresh_status = document.refresh_status.clone().unwrap_or_default();
    let refresh_status_style = visibility_style(document.refresh_status.is_some());

    let alert_level_value = document
        .alert
        .as_ref()
        .map(|alert| alert.level.as_str())
        .unwrap_or("normal");
    let siren_active = document
        .alert
        .as_ref()
        .is_some_and(|alert| alert.siren_active);
    let siren_active_value = bool_attr(siren_active);
    let siren_style = visibility_style(siren_active);
    let total_class = total_count_class(document);
    let total_count = document
        .alert
        .as_ref()
        .map(|alert| alert.count.to_string())
        .unwrap_or_else(|| "0".to_string());

    let agent_selected_value = document
        .agent_filter
        .selected()
        .unwrap_or_default()
        .to_string();
    let all_agents_selected = document.agent_filter.selected().is_none();
    let agent_options = document
        .agent_filter
        .options()
        .iter()
        .map(|option| {
            let selected = document.agent_filter.is_selected(&option.id);
            view! {
                <option value=option.id.clone() selected=selected>
                    {option.name.clone()}
                </option>
            }
        })
        .collect_view();

    let sections = SectionId::ALL
        .into_iter()
        .map(|section| render_section(document.section(section)))
        .collect_view();
    let modal = render_ticket_modal(document.ticket_detail.as_ref());

    let shell = view! {
        <div
            id="beacon-shell"
            class="thebeacon-layout"
            data-app="thebeacon-dashboard"
            data-theme=theme_attr
            data-color-theme=color_theme_attr
            data-sidebar-state=sidebar_state_attr
            data-view-name=view_name
        >
            <aside id="beacon-sidebar" class="side-panel">
                <h2 class="side-panel__title">{document.app_name.clone()}</h2>
                <button
                    id="sidebar-toggle"
                    type="button"
                    aria-controls="beacon-sidebar"
                    aria-expanded=sidebar_expanded
                >
                    Toggle Sidebar
                </button>
                <button id="theme-toggle" type="button" data-theme-target=theme_toggle_target>
                    Toggle Theme
                </button>
                <label for="agent-filter">Agent</label>
                <select id="agent-filter" data-selected-agent=agent_selected_value>
                    <option value="" selected=all_agents_selected>
                        {beacon_dashboard::agent_filter::ALL_AGENTS_LABEL}
                    </option>
                    {agent_options}
                </select>
            </aside>
            <main id="beacon-main">
                <header class="page-header">
                    <h1 class="page-header__title">{document.app_name.clone()}</h1>
                    <div
                        id="api-error-banner"
                        class="error-banner"
                        role="alert"
                        aria-hidden=banner_hidden
                        style=banner_style
                    >
                        <span id="api-error-message">{banner_message}</span>
                    </div>
                    <div class="refresh-controls">
                        <button id="refresh-btn" type="button">Refresh</button>
                        <button id="force-refresh-btn" type="button">Force Refresh</button>
                        <span
                            id="refresh-status"
                            aria-live="polite"
                            style=refresh_status_style
                        >
                            {refresh_status}
                        </span>
                    </div>
                    <div
                        id="total-active-items"
                        data-alert-level=alert_level_value
                        data-siren-active=siren_active_value
                    >
                        <span id="siren-left" class="siren" style=siren_style></span>
                        <span id="total-active-items-count" class=total_class>{total_count}</span>
                        <span id="siren-right" class="siren" style=siren_style></span>
                    </div>
                    <p class="generated-time">
                        "Generated: "
                        <span id="dashboard-generated-time">{document.generated_time_display.clone()}</span>
                    </p>
                </header>
                {sections}
            </main>
            {modal}
        </div>
    };
    shell.to_html()
}

/// Renders a complete standalone HTML page around the dashboard shell.
pub fn render_beacon_dashboard_page(context: BeaconDashboardShellContext) -> String {
    let title = escape_html(&context.document.app_name);
    let reload_meta = context
        .auto_reload_seconds
        .map(|seconds| format!("<meta http-equiv=\"refresh\" content=\"{seconds}\">"))
        .unwrap_or_default();
    let shell = render_beacon_dashboard_shell_with_context(context);
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n{reload_meta}<title>{title}</title>\n</head>\n<body>\n{shell}\n</body>\n</html>\n"
    )
}
