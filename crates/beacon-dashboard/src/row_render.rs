use std::fmt::Write as _;

use url::Url;

use crate::date_format::{format_in_zone, DisplayZone, FormatOptions, NOT_AVAILABLE};
use crate::ticket_item::{SectionId, TicketItem};

const SUBJECT_DISPLAY_CHARS: usize = 60;
const NO_SUBJECT: &str = "No Subject";
const UNASSIGNED: &str = "Unassigned";
const SLA_NONE: &str = "sla-none";
const SAFE_SLA_CLASSES: [&str; 3] = ["sla-normal", "sla-responded", SLA_NONE];
const FIRST_RESPONSE_DUE_PREFIX: &str = "FR Due: ";
const RESOLUTION_DUE_PREFIX: &str = "Due: ";
const TICKET_ID_PLACEHOLDER: &str = "{id}";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Inputs shared by every row of a render pass.
pub struct RowRenderContext {
    pub ticket_url_template: Option<String>,
    pub zone: DisplayZone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Which due date the row surfaces, if any.
pub enum DueHint {
    FirstResponse(String),
    Resolution(String),
}

impl DueHint {
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::FirstResponse(_) => FIRST_RESPONSE_DUE_PREFIX,
            Self::Resolution(_) => RESOLUTION_DUE_PREFIX,
        }
    }

    pub fn raw_timestamp(&self) -> &str {
        match self {
            Self::FirstResponse(raw) | Self::Resolution(raw) => raw,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedRow {
    pub item_id: Option<String>,
    pub priority_slug: String,
    pub needs_first_response: bool,
    pub sla_at_risk: bool,
    pub due_hint: Option<DueHint>,
    pub ticket_url: Option<String>,
    pub html: String,
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn truncate_subject(subject: &str) -> String {
    if subject.chars().count() <= SUBJECT_DISPLAY_CHARS {
        return subject.to_string();
    }
    let mut truncated = subject
        .chars()
        .take(SUBJECT_DISPLAY_CHARS)
        .collect::<String>();
    truncated.push_str("...");
    truncated
}

/// Lower-cases, maps spaces to hyphens and drops anything outside `[a-zA-Z0-9_-]`.
pub fn priority_slug(priority: &str) -> String {
    priority
        .to_lowercase()
        .chars()
        .map(|ch| if ch == ' ' { '-' } else { ch })
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '-')
        .collect()
}

pub fn sla_at_risk(sla_class: &str) -> bool {
    !sla_class.is_empty() && !SAFE_SLA_CLASSES.contains(&sla_class)
}

pub fn due_hint(item: &TicketItem) -> Option<DueHint> {
    let at_risk = sla_at_risk(item.sla_class_name().unwrap_or(SLA_NONE));
    if !at_risk || item.has_first_response() {
        return None;
    }
    if let Some(due) = item.first_response_due() {
        return Some(DueHint::FirstResponse(due.to_string()));
    }
    if item.is_service_request() {
        if let Some(due) = item.resolution_due() {
            return Some(DueHint::Resolution(due.to_string()));
        }
    }
    None
}

/// Expands the external ticket link. Only absolute `http`/`https` results are returned.
pub fn ticket_link_url(template: Option<&str>, item_id: &str) -> Option<String> {
    let template = template.map(str::trim).filter(|raw| !raw.is_empty())?;
    if item_id.is_empty() {
        return None;
    }
    let encoded_id = url::form_urlencoded::byte_serialize(item_id.as_bytes()).collect::<String>();
    let expanded = if template.contains(TICKET_ID_PLACEHOLDER) {
        template.replace(TICKET_ID_PLACEHOLDER, &encoded_id)
    } else {
        format!("{template}{encoded_id}")
    };
    let parsed = Url::parse(&expanded).ok()?;
    matches!(parsed.scheme(), "http" | "https").then(|| parsed.to_string())
}

/// Renders one `<tr>` for `item`. Every interpolated value is escaped.
pub fn render_item_row(
    item: &TicketItem,
    section: SectionId,
    context: &RowRenderContext,
) -> RenderedRow {
    let item_id = item.id_str().filter(|raw| !raw.is_empty());
    let display_id = item_id.unwrap_or(NOT_AVAILABLE);
    let subject = item
        .subject_text()
        .map(truncate_subject)
        .unwrap_or_else(|| NO_SUBJECT.to_string());
    let priority = item.priority_label().unwrap_or(NOT_AVAILABLE);
    let sla_class = item.sla_class_name().unwrap_or(SLA_NONE);
    let slug = priority_slug(priority);
    let needs_first_response = !item.has_first_response() && item.first_response_due().is_some();
    let at_risk = sla_at_risk(sla_class);
    let hint = due_hint(item);
    let ticket_url = item_id
        .and_then(|id| ticket_link_url(context.ticket_url_template.as_deref(), id));

    let mut html = String::with_capacity(512);
    html.push_str("<tr>");
    match &ticket_url {
        Some(href) => {
            let _ = write!(
                html,
                r#"<td><a href="{}" target="_blank" rel="noopener">{}</a></td>"#,
                escape_html(href),
                escape_html(display_id)
            );
        }
        None => {
            let _ = write!(html, "<td>{}</td>", escape_html(display_id));
        }
    }
    let _ = write!(
        html,
        r##"<td><a href="#" class="modal-trigger" data-item-id="{}" data-section-prefix="{}">{}</a></td>"##,
        escape_html(display_id),
        section.as_str(),
        escape_html(&subject)
    );
    let _ = write!(
        html,
        "<td>{}</td><td>{}</td>",
        escape_html(item.requester_text().unwrap_or(NOT_AVAILABLE)),
        escape_html(item.agent_text().unwrap_or(UNASSIGNED))
    );
    let _ = write!(
        html,
        r#"<td><span class="priority-badge priority-badge--{}">{}</span></td>"#,
        slug,
        escape_html(priority)
    );
    let _ = write!(
        html,
        r#"<td><span class="sla-status {}">{}</span>"#,
        escape_html(sla_class),
        escape_html(item.sla_label().unwrap_or(NOT_AVAILABLE))
    );
    if let Some(hint) = &hint {
        let formatted = format_in_zone(
            Some(hint.raw_timestamp()),
            FormatOptions::with_prefix(hint.prefix()),
            context.zone,
        );
        let _ = write!(
            html,
            r#"<div class="datetime-container" data-utc-datetime="{}" data-prefix="{}"><small class="local-datetime">{}</small></div>"#,
            escape_html(hint.raw_timestamp()),
            hint.prefix(),
            escape_html(&formatted)
        );
    }
    html.push_str("</td>");
    let _ = write!(
        html,
        "<td>{}</td><td>{}</td>",
        escape_html(item.updated_friendly_text().unwrap_or(NOT_AVAILABLE)),
        escape_html(item.created_days_old_text().unwrap_or(NOT_AVAILABLE))
    );
    html.push_str("</tr>");

    RenderedRow {
        item_id: item_id.map(str::to_string),
        priority_slug: slug,
        needs_first_response,
        sla_at_risk: at_risk,
        due_hint: hint,
        ticket_url,
        html,
    }
}
