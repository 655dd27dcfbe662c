//! Headless document model the render pass writes into.

use crate::agent_filter::AgentFilterState;
use crate::alert_state::AlertIndicator;
use crate::date_format::NOT_AVAILABLE;
use crate::row_render::{render_item_row, RenderedRow, RowRenderContext};
use crate::sort_engine::SortState;
use crate::ticket_detail::TicketDetailView;
use crate::ticket_item::{DashboardSnapshot, SectionId, TicketItem};

#[derive(Debug, Clone, PartialEq, Eq)]
/// One table section: count badge, rows, empty message, sort indicator.
pub struct SectionView {
    pub section: SectionId,
    pub title: String,
    pub item_count: usize,
    pub rows: Vec<RenderedRow>,
    pub empty_message_visible: bool,
    pub wrapper_hidden: bool,
    pub sort: SortState,
}

impl SectionView {
    pub fn new(section: SectionId) -> Self {
        Self {
            section,
            title: section.default_title().to_string(),
            item_count: 0,
            rows: Vec::new(),
            empty_message_visible: false,
            wrapper_hidden: false,
            sort: SortState::default(),
        }
    }

    pub fn rows_html(&self) -> String {
        self.rows.iter().map(|row| row.html.as_str()).collect()
    }

    pub fn row_ids(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|row| row.item_id.as_deref())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardDocument {
    pub app_name: String,
    pub view_name: Option<String>,
    pub sections: [SectionView; 4],
    pub banner: Option<String>,
    pub refresh_status: Option<String>,
    pub agent_filter: AgentFilterState,
    pub alert: Option<AlertIndicator>,
    pub generated_time_display: String,
    pub ticket_detail: Option<TicketDetailView>,
}

impl Default for DashboardDocument {
    fn default() -> Self {
        Self::new("TheBeacon")
    }
}

impl DashboardDocument {
    pub fn new(app_name: impl Into<String>) -> Self {
        Self {
            app_name: app_name.into(),
            view_name: None,
            sections: SectionId::ALL.map(SectionView::new),
            banner: None,
            refresh_status: None,
            agent_filter: AgentFilterState::default(),
            alert: None,
            generated_time_display: NOT_AVAILABLE.to_string(),
            ticket_detail: None,
        }
    }

    pub fn section(&self, section: SectionId) -> &SectionView {
        &self.sections[section.index()]
    }

    pub fn section_mut(&mut self, section: SectionId) -> &mut SectionView {
        &mut self.sections[section.index()]
    }

    /// Server-provided section names win over the built-in titles.
    pub fn apply_section_titles(&mut self, snapshot: &DashboardSnapshot) {
        for section in SectionId::ALL {
            let title = snapshot
                .section_title(section)
                .unwrap_or(section.default_title());
            self.section_mut(section).title = title.to_string();
        }
    }
}

/// Replaces the rows of one section. No other section is touched.
pub fn update_item_section(
    document: &mut DashboardDocument,
    section: SectionId,
    items: &[TicketItem],
    sort: &SortState,
    context: &RowRenderContext,
) {
    let view = document.section_mut(section);
    view.item_count = items.len();
    view.rows = items
        .iter()
        .map(|item| render_item_row(item, section, context))
        .collect();
    view.empty_message_visible = items.is_empty();
    view.wrapper_hidden = items.is_empty();
    view.sort = sort.clone();
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::{update_item_section, DashboardDocument};
    use crate::row_render::RowRenderContext;
    use crate::sort_engine::{SortDirection, SortState};
    use crate::ticket_item::{DashboardSnapshot, SectionId, TicketItem};

    fn items(value: serde_json::Value) -> Vec<TicketItem> {
        serde_json::from_value(value).expect("ticket items")
    }

    #[test]
    fn unit_new_document_shows_sections_without_empty_message() {
        let document = DashboardDocument::new("Beacon");
        for section in SectionId::ALL {
            let view = document.section(section);
            assert!(!view.wrapper_hidden);
            assert!(!view.empty_message_visible);
            assert_eq!(view.title, section.default_title());
        }
        assert_eq!(document.generated_time_display, "N/A");
    }

    #[test]
    fn functional_update_item_section_writes_rows_count_and_sort_indicator() {
        let mut document = DashboardDocument::default();
        let sort = SortState {
            key: Some("subject".to_string()),
            direction: SortDirection::Desc,
        };
        update_item_section(
            &mut document,
            SectionId::S3,
            &items(json!([{"id": 1, "subject": "a"}, {"id": 2, "subject": "b"}])),
            &sort,
            &RowRenderContext::default(),
        );
        let view = document.section(SectionId::S3);
        assert_eq!(view.item_count, 2);
        assert_eq!(view.row_ids(), vec!["1", "2"]);
        assert!(view.rows_html().starts_with("<tr>"));
        assert_eq!(view.sort.indicator_for("subject"), Some("sort-desc"));
        assert!(!view.wrapper_hidden);
        assert_eq!(document.section(SectionId::S1).item_count, 0);
        assert!(!document.section(SectionId::S1).wrapper_hidden);
    }

    #[test]
    fn regression_update_item_section_hides_empty_sections() {
        let mut document = DashboardDocument::default();
        update_item_section(
            &mut document,
            SectionId::S2,
            &items(json!([{"id": 1}])),
            &SortState::default(),
            &RowRenderContext::default(),
        );
        update_item_section(
            &mut document,
            SectionId::S2,
            &[],
            &SortState::default(),
            &RowRenderContext::default(),
        );
        let view = document.section(SectionId::S2);
        assert_eq!(view.item_count, 0);
        assert!(view.rows.is_empty());
        assert!(view.empty_message_visible);
        assert!(view.wrapper_hidden);
    }

    #[test]
    fn unit_apply_section_titles_prefers_server_names() {
        let snapshot: DashboardSnapshot =
            serde_json::from_value(json!({"section2_name_js": "Waiting on You"}))
                .expect("snapshot");
        let mut document = DashboardDocument::default();
        document.apply_section_titles(&snapshot);
        assert_eq!(document.section(SectionId::S2).title, "Waiting on You");
        assert_eq!(document.section(SectionId::S1).title, "Open Tickets");
    }
}
