//! Publish/subscribe plumbing between the view-model and whatever renders it.

use crate::view_model::{IssuesView, ViewChange};
use std::sync::{Arc, Mutex, PoisonError};

/// Receives a snapshot of the view every time observable state changes.
///
/// Listeners run on whichever task made the change, after the state lock is released,
/// so snapshots carry [`IssuesView::generation`] for ordering.
pub trait Listener: Send + Sync {
    fn on_change(&self, change: ViewChange, view: &IssuesView);
}

impl<F> Listener for F
where
    F: Fn(ViewChange, &IssuesView) + Send + Sync,
{
    fn on_change(&self, change: ViewChange, view: &IssuesView) {
        self(change, view)
    }
}

/// The registered listeners, notified in subscription order.
#[derive(Default)]
pub struct Subscribers {
    listeners: Mutex<Vec<Arc<dyn Listener>>>,
}

impl Subscribers {
    pub fn subscribe(&self, listener: Arc<dyn Listener>) {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub fn notify(&self, change: ViewChange, view: &IssuesView) {
        // Snapshot the list so a listener may subscribe another one without deadlocking.
        let listeners = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener.on_change(change, view);
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Logs each view change.
pub struct TracingListener;

impl Listener for TracingListener {
    fn on_change(&self, change: ViewChange, view: &IssuesView) {
        match change {
            ViewChange::Query => {
                tracing::debug!(query = ?view.query, "Query parameters changed");
            }
            ViewChange::Reset => {
                tracing::debug!(generation = view.generation, "Issues list cleared");
            }
            ViewChange::Loaded => {
                tracing::info!(
                    generation = view.generation,
                    count = view.issues.len(),
                    "Issues list updated"
                );
            }
            ViewChange::Failed => {
                tracing::error!(
                    generation = view.generation,
                    "Issues fetch failed: {:?}",
                    view.status
                );
            }
        }
    }
}
