use crate::ticket_item::{SectionId, TicketId};

#[derive(Debug, Clone, PartialEq, Eq)]
/// Every user interaction the dashboard reacts to.
pub enum DashboardAction {
    Refresh,
    ForceRefresh,
    SortColumn { section: SectionId, key: String },
    SelectAgent(Option<String>),
    OpenTicketDetail { section: SectionId, item_id: TicketId },
    CloseTicketDetail,
    ToggleTheme,
    SetColorTheme(Option<String>),
    ToggleSidebar,
    Shutdown,
}

impl DashboardAction {
    /// Whether handling this action needs a fresh fetch.
    pub fn triggers_refresh(&self) -> bool {
        matches!(
            self,
            Self::Refresh | Self::ForceRefresh | Self::SelectAgent(_)
        )
    }
}

pub const ACTION_USAGE: &str = "commands: refresh|r, force-refresh|f, sort <s1-s4> <field>, \
agent <id|all>, open <s1-s4> <id>, close, theme, color <name|default>, sidebar, quit|q";

fn parse_section(raw: Option<&str>, command: &str) -> Result<SectionId, String> {
    let raw = raw.ok_or_else(|| format!("usage: {command} <s1-s4> ..."))?;
    SectionId::parse(raw).ok_or_else(|| format!("unknown section '{raw}' (expected s1-s4)"))
}

fn ensure_no_extra_args(extra: Option<&str>, command: &str) -> Result<(), String> {
    match extra {
        Some(value) => Err(format!("unexpected argument '{value}' for '{command}'")),
        None => Ok(()),
    }
}

/// Parses one line of the text command protocol. Blank lines yield `Ok(None)`.
pub fn parse_dashboard_action(line: &str) -> Result<Option<DashboardAction>, String> {
    let mut tokens = line.split_whitespace();
    let Some(command) = tokens.next() else {
        return Ok(None);
    };
    let command = command.to_ascii_lowercase();
    let action = match command.as_str() {
        "refresh" | "r" => DashboardAction::Refresh,
        "force-refresh" | "f" => DashboardAction::ForceRefresh,
        "sort" => {
            let section = parse_section(tokens.next(), "sort")?;
            let key = tokens
                .next()
                .ok_or_else(|| "usage: sort <s1-s4> <field>".to_string())?;
            DashboardAction::SortColumn {
                section,
                key: key.to_string(),
            }
        }
        "agent" => {
            let raw = tokens
                .next()
                .ok_or_else(|| "usage: agent <id|all>".to_string())?;
            if raw.eq_ignore_ascii_case("all") {
                DashboardAction::SelectAgent(None)
            } else {
                DashboardAction::SelectAgent(Some(raw.to_string()))
            }
        }
        "open" => {
            let section = parse_section(tokens.next(), "open")?;
            let item_id = tokens
                .next()
                .ok_or_else(|| "usage: open <s1-s4> <id>".to_string())?;
            DashboardAction::OpenTicketDetail {
                section,
                item_id: TicketId::new(item_id),
            }
        }
        "close" => DashboardAction::CloseTicketDetail,
        "theme" => DashboardAction::ToggleTheme,
        "color" => {
            let raw = tokens
                .next()
                .ok_or_else(|| "usage: color <name|default>".to_string())?;
            if raw.eq_ignore_ascii_case("default") {
                DashboardAction::SetColorTheme(None)
            } else {
                DashboardAction::SetColorTheme(Some(raw.to_string()))
            }
        }
        "sidebar" => DashboardAction::ToggleSidebar,
        "quit" | "q" | "exit" => DashboardAction::Shutdown,
        "help" | "?" => return Err(ACTION_USAGE.to_string()),
        other => return Err(format!("unknown command '{other}'; {ACTION_USAGE}")),
    };
    ensure_no_extra_args(tokens.next(), &command)?;
    Ok(Some(action))
}
