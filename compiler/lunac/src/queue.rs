//! Change events waiting for the single writer.

use crossbeam::channel::{unbounded, Receiver, Sender};
use luna_vfs::FileUri;

/// A watched-file notification kind.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FileChange {
    Created,
    Changed,
    Deleted,
}

/// One change to apply to the workspace.
#[derive(Clone, Debug, PartialEq)]
pub enum WorkspaceEvent {
    Opened { uri: FileUri, text: String },
    Edited { uri: FileUri, text: String },
    Closed { uri: FileUri },
    Watched { uri: FileUri, change: FileChange },
    RootAdded(FileUri),
    RootRemoved(FileUri),
    Configuration(serde_json::Value),
    /// Rescan every root. Several pending reloads run as one sweep.
    Reload,
}

/// A cloneable handle on the event channel.
///
/// Any thread may push; only the coordinator drains, one event at a time.
#[derive(Clone, Debug)]
pub struct ChangeQueue {
    sender: Sender<WorkspaceEvent>,
    receiver: Receiver<WorkspaceEvent>,
}

impl Default for ChangeQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        ChangeQueue { sender, receiver }
    }

    pub fn push(&self, event: WorkspaceEvent) {
        // Both ends live in `self`, so the channel cannot be disconnected.
        let _ = self.sender.send(event);
    }

    /// Take the next event, if any, without blocking.
    pub fn pop(&self) -> Option<WorkspaceEvent> {
        self.receiver.try_recv().ok()
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn fifo_across_clones_and_threads() {
        let queue = ChangeQueue::new();
        let producer = queue.clone();
        let handle = std::thread::spawn(move || {
            for _ in 0..3 {
                producer.push(WorkspaceEvent::Reload);
            }
        });
        assert!(handle.join().is_ok());
        queue.push(WorkspaceEvent::Closed {
            uri: FileUri::scheme_root("mem").join("a.lua"),
        });

        assert_eq!(queue.len(), 4);
        let mut drained = Vec::new();
        while let Some(event) = queue.pop() {
            drained.push(event);
        }
        assert_eq!(drained.len(), 4);
        assert!(matches!(drained[3], WorkspaceEvent::Closed { .. }));
        assert!(queue.is_empty());
    }
}
