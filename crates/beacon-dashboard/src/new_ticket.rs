use std::collections::HashSet;

use crate::ticket_item::{TicketId, TicketItem};

/// Ids in `current` that were absent from `previous`, in `current` order.
///
/// An empty `previous` list (first load, or an empty section) reports nothing.
pub fn detect_new_ticket_ids(previous: &[TicketItem], current: &[TicketItem]) -> Vec<TicketId> {
    if previous.is_empty() {
        return Vec::new();
    }
    let known = previous
        .iter()
        .filter_map(|item| item.id.as_ref())
        .collect::<HashSet<_>>();
    let mut reported = HashSet::new();
    current
        .iter()
        .filter_map(|item| item.id.as_ref())
        .filter(|id| !known.contains(id) && reported.insert(*id))
        .cloned()
        .collect()
}
