use crate::date_format::{format_in_zone, DisplayZone, FormatOptions, NOT_AVAILABLE};
use crate::row_render::{escape_html, priority_slug};
use crate::ticket_item::{DashboardSnapshot, SectionId, TicketId};

pub const NO_DESCRIPTION: &str = "No description provided.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub label: &'static str,
    /// Already-escaped HTML fragment.
    pub value_html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Content of the ticket detail modal.
pub struct TicketDetailView {
    pub section: SectionId,
    pub item_id: TicketId,
    pub title: String,
    pub rows: Vec<DetailRow>,
    pub description: String,
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" | "#x27" => Some('\''),
        "nbsp" => Some(' '),
        _ => None,
    }
}

/// Plain text of an HTML fragment: tags dropped, common entities decoded.
pub fn strip_markup(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.char_indices().peekable();
    while let Some((index, ch)) = chars.next() {
        match ch {
            '<' if chars
                .peek()
                .is_some_and(|(_, next)| next.is_ascii_alphabetic() || matches!(next, '/' | '!')) =>
            {
                for (_, skipped) in chars.by_ref() {
                    if skipped == '>' {
                        break;
                    }
                }
            }
            '&' => {
                let rest = &raw[index + 1..];
                let decoded = rest
                    .find(';')
                    .filter(|end| *end <= 6)
                    .and_then(|end| decode_entity(&rest[..end]).map(|ch| (ch, end)));
                match decoded {
                    Some((decoded, end)) => {
                        out.push(decoded);
                        for _ in 0..=end {
                            chars.next();
                        }
                    }
                    None => out.push('&'),
                }
            }
            _ => out.push(ch),
        }
    }
    out.trim().to_string()
}

fn detail_row(label: &'static str, value: Option<&str>) -> DetailRow {
    DetailRow {
        label,
        value_html: escape_html(value.unwrap_or(NOT_AVAILABLE)),
    }
}

/// Builds the detail view for `item_id` in `section` of the current snapshot.
pub fn build_ticket_detail(
    snapshot: &DashboardSnapshot,
    section: SectionId,
    item_id: &TicketId,
    zone: DisplayZone,
) -> Option<TicketDetailView> {
    let item = snapshot.find_item(section, item_id)?;
    let subject = item.subject_text().unwrap_or(NOT_AVAILABLE);
    let priority = item.priority_label().unwrap_or(NOT_AVAILABLE);
    let created = format_in_zone(
        item.created_at_str.as_deref(),
        FormatOptions::default(),
        zone,
    );
    let updated = format_in_zone(
        item.updated_at_str.as_deref(),
        FormatOptions::default(),
        zone,
    );

    let rows = vec![
        detail_row("Requester", item.requester_text()),
        detail_row("Agent", Some(item.agent_text().unwrap_or("Unassigned"))),
        DetailRow {
            label: "Priority",
            value_html: format!(
                r#"<span class="priority-badge priority-badge--{}">{}</span>"#,
                priority_slug(priority),
                escape_html(priority)
            ),
        },
        detail_row("Status", item.sla_label()),
        detail_row(
            "Created",
            Some(&format!(
                "{} ({created})",
                item.created_days_old_text().unwrap_or(NOT_AVAILABLE)
            )),
        ),
        detail_row(
            "Last Updated",
            Some(&format!(
                "{} ({updated})",
                item.updated_friendly_text().unwrap_or(NOT_AVAILABLE)
            )),
        ),
    ];

    let description = item
        .description_text
        .as_deref()
        .map(strip_markup)
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| NO_DESCRIPTION.to_string());

    Some(TicketDetailView {
        section,
        item_id: item_id.clone(),
        title: format!("Ticket #{item_id}: {subject}"),
        rows,
        description,
    })
}
