use std::collections::BTreeSet;

use serde_json::{Map, Value};

pub const ALL_AGENTS_LABEL: &str = "All Agents";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentOption {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentReconcileOutcome {
    Unchanged,
    Rebuilt { selection_kept: bool },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Agent dropdown contents plus the current selection (`None` is "All Agents").
pub struct AgentFilterState {
    options: Vec<AgentOption>,
    selected: Option<String>,
}

fn array_index_key(raw: &str) -> Option<u32> {
    if raw.is_empty() || (raw.len() > 1 && raw.starts_with('0')) {
        return None;
    }
    if !raw.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u32>().ok().filter(|index| *index < u32::MAX)
}

fn agent_display_name(id: &str, value: &Value) -> String {
    match value {
        Value::String(name) => name.clone(),
        Value::Null => id.to_string(),
        other => other.to_string(),
    }
}

/// Options in object-key enumeration order: integer keys ascending, then the rest.
fn options_from_mapping(mapping: &Map<String, Value>) -> Vec<AgentOption> {
    let mut options = mapping
        .iter()
        .map(|(id, value)| AgentOption {
            id: id.clone(),
            name: agent_display_name(id, value),
        })
        .collect::<Vec<_>>();
    options.sort_by(|left, right| {
        match (array_index_key(&left.id), array_index_key(&right.id)) {
            (Some(l), Some(r)) => l.cmp(&r),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => left.id.cmp(&right.id),
        }
    });
    options
}

impl AgentFilterState {
    pub fn new(selected: Option<String>) -> Self {
        Self {
            options: Vec::new(),
            selected: selected.filter(|id| !id.trim().is_empty()),
        }
    }

    pub fn options(&self) -> &[AgentOption] {
        &self.options
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, agent_id: Option<String>) {
        self.selected = agent_id.filter(|id| !id.trim().is_empty());
    }

    pub fn is_selected(&self, agent_id: &str) -> bool {
        self.selected.as_deref() == Some(agent_id)
    }

    /// Rebuilds the option list only when the id set differs from the current one.
    pub fn reconcile(&mut self, mapping: Option<&Map<String, Value>>) -> AgentReconcileOutcome {
        let Some(mapping) = mapping else {
            return AgentReconcileOutcome::Unchanged;
        };
        let current = self
            .options
            .iter()
            .map(|option| option.id.as_str())
            .collect::<BTreeSet<_>>();
        let incoming = mapping.keys().map(String::as_str).collect::<BTreeSet<_>>();
        if current == incoming {
            return AgentReconcileOutcome::Unchanged;
        }

        self.options = options_from_mapping(mapping);
        let selection_kept = match self.selected.as_deref() {
            Some(selected) => mapping.contains_key(selected),
            None => true,
        };
        if !selection_kept {
            self.selected = None;
        }
        AgentReconcileOutcome::Rebuilt { selection_kept }
    }
}
