//! Shared worker status
//!
//! One [`StatusChannel`] exists per worker. The poll loop, the output monitor
//! and the host all read and write it; every write goes through the
//! `watch` sender so read-modify-write operations are atomic and readers are
//! woken on change.

use std::sync::Arc;

use shared::WorkerStatus;
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct StatusChannel {
    sender: Arc<watch::Sender<WorkerStatus>>,
}

impl Default for StatusChannel {
    fn default() -> Self {
        Self::new(WorkerStatus::default())
    }
}

impl StatusChannel {
    pub fn new(initial: WorkerStatus) -> Self {
        let (sender, _) = watch::channel(initial);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn get(&self) -> WorkerStatus {
        *self.sender.borrow()
    }

    /// Overwrite the status unconditionally
    pub fn revise(&self, status: WorkerStatus) {
        self.sender.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status;
            true
        });
    }

    /// Replace `from` with `to`; returns false if the status was something else
    pub fn transition(&self, from: WorkerStatus, to: WorkerStatus) -> bool {
        self.sender.send_if_modified(|current| {
            if *current != from || from == to {
                return false;
            }
            *current = to;
            true
        })
    }

    /// Force `Errored` if the worker is loading or running
    ///
    /// Returns the status seen before the call and whether it was replaced.
    pub fn fail_if_active(&self) -> (WorkerStatus, bool) {
        let mut previous = WorkerStatus::default();
        let changed = self.sender.send_if_modified(|current| {
            previous = *current;
            if current.is_active() {
                *current = WorkerStatus::Errored;
                return true;
            }
            false
        });
        (previous, changed)
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkerStatus> {
        self.sender.subscribe()
    }

    /// Wait until `predicate` holds and return the matching status
    pub async fn wait_until<F>(&self, mut predicate: F) -> WorkerStatus
    where
        F: FnMut(WorkerStatus) -> bool,
    {
        let mut rx = self.subscribe();
        loop {
            let status = *rx.borrow_and_update();
            if predicate(status) {
                return status;
            }
            // The sender lives as long as `self`, so this cannot fail here
            if rx.changed().await.is_err() {
                return self.get();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_revise_and_get() {
        let status = StatusChannel::new(WorkerStatus::Disabled);
        status.revise(WorkerStatus::Loading);
        assert_eq!(status.get(), WorkerStatus::Loading);

        let clone = status.clone();
        clone.revise(WorkerStatus::Running);
        assert_eq!(status.get(), WorkerStatus::Running);
    }

    #[test]
    fn test_transition_is_compare_and_set() {
        let status = StatusChannel::new(WorkerStatus::Loading);
        assert!(status.transition(WorkerStatus::Loading, WorkerStatus::Running));
        assert!(!status.transition(WorkerStatus::Loading, WorkerStatus::Running));
        assert_eq!(status.get(), WorkerStatus::Running);
    }

    #[test]
    fn test_fail_if_active() {
        for (start, expected) in [
            (WorkerStatus::Loading, WorkerStatus::Errored),
            (WorkerStatus::Running, WorkerStatus::Errored),
            (WorkerStatus::Disabled, WorkerStatus::Disabled),
            (WorkerStatus::Idle, WorkerStatus::Idle),
            (WorkerStatus::Errored, WorkerStatus::Errored),
        ] {
            let status = StatusChannel::new(start);
            let (previous, changed) = status.fail_if_active();
            assert_eq!(previous, start);
            assert_eq!(changed, start.is_active());
            assert_eq!(status.get(), expected);
        }
    }

    #[tokio::test]
    async fn test_subscribers_see_changes() {
        let status = StatusChannel::new(WorkerStatus::Loading);
        let mut rx = status.subscribe();

        status.revise(WorkerStatus::Running);
        tokio::time::timeout(Duration::from_secs(1), rx.changed())
            .await
            .expect("change notification")
            .unwrap();
        assert_eq!(*rx.borrow(), WorkerStatus::Running);
    }

    #[tokio::test]
    async fn test_wait_until() {
        let status = StatusChannel::new(WorkerStatus::Loading);
        let writer = status.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            writer.revise(WorkerStatus::Errored);
        });

        let seen = tokio::time::timeout(
            Duration::from_secs(1),
            status.wait_until(|s| s == WorkerStatus::Errored),
        )
        .await
        .unwrap();
        assert_eq!(seen, WorkerStatus::Errored);
    }
}
