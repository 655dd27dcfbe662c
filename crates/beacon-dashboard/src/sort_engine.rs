use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::date_format::parse_utc_timestamp;
use crate::ticket_item::{FieldValue, SectionId, TicketItem};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    /// Header class marking the active sort column.
    pub fn indicator_class(self) -> &'static str {
        match self {
            Self::Asc => "sort-asc",
            Self::Desc => "sort-desc",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
/// Per-section sort selection. `key == None` keeps server order.
pub struct SortState {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortState {
    /// Column click: the same key flips direction, a new key starts ascending.
    pub fn apply_click(&mut self, key: &str) {
        if self.key.as_deref() == Some(key) {
            self.direction = self.direction.toggled();
        } else {
            self.key = Some(key.to_string());
            self.direction = SortDirection::Asc;
        }
    }

    pub fn indicator_for(&self, key: &str) -> Option<&'static str> {
        (self.key.as_deref() == Some(key)).then(|| self.direction.indicator_class())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SectionSortStates {
    states: [SortState; 4],
}

impl SectionSortStates {
    pub fn get(&self, section: SectionId) -> &SortState {
        &self.states[section.index()]
    }

    pub fn apply_click(&mut self, section: SectionId, key: &str) -> &SortState {
        let state = &mut self.states[section.index()];
        state.apply_click(key);
        state
    }
}

pub fn is_date_key(key: &str) -> bool {
    key.ends_with("_at_str") || key.ends_with("_by_str")
}

/// Case-insensitive comparison; on a tie lowercase sorts before uppercase.
pub fn locale_compare(left: &str, right: &str) -> Ordering {
    let folded = left
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(right.chars().flat_map(char::to_lowercase));
    if folded != Ordering::Equal {
        return folded;
    }
    for (l, r) in left.chars().zip(right.chars()) {
        if l == r {
            continue;
        }
        match (l.is_lowercase(), r.is_lowercase()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => return l.cmp(&r),
        }
    }
    left.len().cmp(&right.len())
}

enum SortKey<'a> {
    Date(DateTime<Utc>),
    Value(FieldValue<'a>),
    UnparseableDate,
}

impl SortKey<'_> {
    fn tier(&self) -> u8 {
        match self {
            Self::Date(_) | Self::Value(_) => 0,
            Self::UnparseableDate => 1,
        }
    }
}

fn sort_key<'a>(item: &'a TicketItem, key: &str, date_key: bool) -> Option<SortKey<'a>> {
    let value = item.field_value(key)?;
    if !date_key {
        return Some(SortKey::Value(value));
    }
    Some(match parse_utc_timestamp(&value.as_text()) {
        Some(parsed) => SortKey::Date(parsed),
        None => SortKey::UnparseableDate,
    })
}

fn compare_present(left: &SortKey<'_>, right: &SortKey<'_>) -> Ordering {
    match (left, right) {
        (SortKey::Date(l), SortKey::Date(r)) => l.cmp(r),
        (SortKey::Value(l), SortKey::Value(r)) => match (l, r) {
            (FieldValue::Number(l), FieldValue::Number(r)) => l.total_cmp(r),
            // Numbers rank ahead of text in mixed columns.
            (FieldValue::Number(_), FieldValue::Text(_)) => Ordering::Less,
            (FieldValue::Text(_), FieldValue::Number(_)) => Ordering::Greater,
            (FieldValue::Text(l), FieldValue::Text(r)) => locale_compare(l, r),
        },
        _ => Ordering::Equal,
    }
}

fn compare_items(
    left: &TicketItem,
    right: &TicketItem,
    key: &str,
    direction: SortDirection,
) -> Ordering {
    let date_key = is_date_key(key);
    match (sort_key(left, key, date_key), sort_key(right, key, date_key)) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(l), Some(r)) => l
            .tier()
            .cmp(&r.tier())
            .then_with(|| direction.apply(compare_present(&l, &r))),
    }
}

/// Stable sort by the state's key. Missing values always end up last.
pub fn sort_items(mut items: Vec<TicketItem>, state: &SortState) -> Vec<TicketItem> {
    let Some(key) = state.key.as_deref() else {
        return items;
    };
    items.sort_by(|left, right| compare_items(left, right, key, state.direction));
    items
}
