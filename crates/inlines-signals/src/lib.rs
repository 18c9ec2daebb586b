//! # inlines-signals
//!
//! A typed observer registry. Components publish notifications through a
//! [`Signal<T>`] and interested parties connect named receivers to it, so the
//! publisher never needs to know who is listening. Formset managers use one
//! signal per notification kind (row added, row removed).
//!
//! ## Usage
//!
//! ```
//! use inlines_signals::Signal;
//! use std::sync::Arc;
//!
//! struct RowAdded { prefix: String }
//!
//! let signal: Signal<RowAdded> = Signal::new();
//!
//! signal.connect("datepicker", Arc::new(|event: &RowAdded| {
//!     println!("re-initialize widgets for {}", event.prefix);
//! }));
//!
//! let notified = signal.send(&RowAdded { prefix: "task".into() });
//! assert_eq!(notified, 1);
//! ```

use std::sync::{Arc, RwLock};

/// The type signature for a signal receiver callback.
///
/// Receivers must be `Send + Sync` so that a signal can be shared between
/// the component that owns it and the code that registers against it.
pub type SignalReceiver<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A signal that can be connected to and dispatched.
///
/// Receivers are called in the order they were connected.
pub struct Signal<T: 'static> {
    receivers: RwLock<Vec<(String, SignalReceiver<T>)>>,
}

impl<T: 'static> Default for Signal<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> std::fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("receivers", &self.receiver_ids())
            .finish()
    }
}

impl<T: 'static> Signal<T> {
    /// Creates a new signal with no connected receivers.
    pub fn new() -> Self {
        Self {
            receivers: RwLock::new(Vec::new()),
        }
    }

    /// Connects a receiver to this signal.
    ///
    /// If a receiver with the same ID is already connected, it is replaced in
    /// place and keeps its position in the call order.
    pub fn connect(&self, receiver_id: impl Into<String>, callback: SignalReceiver<T>) {
        let id = receiver_id.into();
        let mut receivers = self.receivers.write().expect("signal lock poisoned");

        if let Some(entry) = receivers.iter_mut().find(|(rid, _)| *rid == id) {
            entry.1 = callback;
        } else {
            receivers.push((id, callback));
        }
    }

    /// Disconnects the receiver with the given ID.
    ///
    /// Returns `true` if a receiver was found and removed.
    pub fn disconnect(&self, receiver_id: &str) -> bool {
        let mut receivers = self.receivers.write().expect("signal lock poisoned");
        let len_before = receivers.len();
        receivers.retain(|(id, _)| id != receiver_id);
        receivers.len() < len_before
    }

    /// Sends the signal to all connected receivers and returns how many were
    /// called.
    ///
    /// The receiver list is snapshotted first, so a receiver may connect or
    /// disconnect receivers on the same signal without deadlocking; such
    /// changes take effect from the next send.
    pub fn send(&self, payload: &T) -> usize {
        let snapshot: Vec<SignalReceiver<T>> = self
            .receivers
            .read()
            .expect("signal lock poisoned")
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        tracing::trace!(receivers = snapshot.len(), "dispatching signal");
        for callback in &snapshot {
            callback(payload);
        }
        snapshot.len()
    }

    /// Returns `true` if a receiver with the given ID is connected.
    pub fn is_connected(&self, receiver_id: &str) -> bool {
        self.receivers
            .read()
            .expect("signal lock poisoned")
            .iter()
            .any(|(id, _)| id == receiver_id)
    }

    /// Returns the IDs of connected receivers in call order.
    pub fn receiver_ids(&self) -> Vec<String> {
        self.receivers
            .read()
            .expect("signal lock poisoned")
            .iter()
            .map(|(id, _)| id.clone())
            .collect()
    }

    /// Returns the number of connected receivers.
    pub fn receiver_count(&self) -> usize {
        self.receivers.read().expect("signal lock poisoned").len()
    }
}
