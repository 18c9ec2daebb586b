//! Notification payloads sent by a [`FormsetManager`](crate::FormsetManager).
//!
//! Page code subscribes with
//! [`on_row_added`](crate::FormsetManager::on_row_added) and
//! [`on_row_removed`](crate::FormsetManager::on_row_removed), typically to
//! re-initialize widgets that do not know about rows created after load.

use inlines_dom::NodeId;

/// Sent after a row has been inserted and the counters updated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowAdded {
    /// The prefix of the formset that grew.
    pub prefix: String,
    /// The new row element.
    pub row: NodeId,
    /// The index assigned to the new row.
    pub index: usize,
}

/// Sent after a row has been removed and the rest renumbered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRemoved {
    /// The prefix of the formset that shrank.
    pub prefix: String,
    /// The detached row element.
    pub row: NodeId,
    /// How many rows remain.
    pub remaining: usize,
}
