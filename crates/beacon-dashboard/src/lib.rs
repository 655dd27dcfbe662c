//! Ticket dashboard data model and render-reconciliation building blocks.
//!
//! Everything here is synchronous and free of I/O except the preferences
//! store: date formatting, row rendering, section updates against the headless
//! document model, sorting, alert levels, agent filter reconciliation,
//! new-ticket detection, the action dispatch table, and the ticket detail view.

pub mod agent_filter;
pub mod alert_state;
pub mod dashboard_action;
pub mod date_format;
pub mod new_ticket;
pub mod preferences;
pub mod row_render;
pub mod section_view;
pub mod sort_engine;
pub mod ticket_detail;
pub mod ticket_item;

pub use agent_filter::{AgentFilterState, AgentOption, AgentReconcileOutcome};
pub use alert_state::{
    AlertIndicator, AlertLevel, AlertStateMachine, AlertThresholds, AlertTransition,
    CelebrationKind, DEFAULT_CELEBRATION_COOLDOWN_MS,
};
pub use dashboard_action::{parse_dashboard_action, DashboardAction};
pub use date_format::{format_to_local, parse_utc_timestamp, DisplayZone, FormatOptions};
pub use new_ticket::detect_new_ticket_ids;
pub use preferences::{ClientPreferences, ClientPreferencesStore, ThemeMode};
pub use row_render::{escape_html, render_item_row, RenderedRow, RowRenderContext};
pub use section_view::{update_item_section, DashboardDocument, SectionView};
pub use sort_engine::{sort_items, SectionSortStates, SortDirection, SortState};
pub use ticket_detail::{build_ticket_detail, TicketDetailView};
pub use ticket_item::{DashboardSnapshot, FieldValue, SectionId, TicketId, TicketItem};
