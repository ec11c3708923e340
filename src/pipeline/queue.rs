//! Handoff queue between the walker and the worker pool.
//!
//! The queue is a bounded channel. Its three states map onto channel
//! semantics: open while the walker holds the sender, draining once the
//! sender is dropped with items still buffered, and closed-and-empty when
//! `recv` returns a disconnect error, which is the sentinel that ends
//! worker execution.
//!
//! Sends block when the queue is full. The bound doubles as a cap on the
//! number of open file handles in flight, since each item carries one.

use crossbeam::channel::{bounded, Receiver, Sender};
use std::fs::File;

/// One discovered file, owned by exactly one worker after dequeue. The
/// worker releases the handle by dropping the item.
#[derive(Debug)]
pub struct WorkItem {
    /// Normalized relative path, already registered in the aggregator.
    pub id: String,
    /// Handle opened by the walker at discovery time.
    pub file: File,
}

pub type WorkSender = Sender<WorkItem>;
pub type WorkReceiver = Receiver<WorkItem>;

/// Builds the bounded handoff channel. The walker owns the only sender;
/// dropping it closes the queue exactly once.
pub fn work_queue(capacity: usize) -> (WorkSender, WorkReceiver) {
    bounded(capacity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn item(id: &str) -> WorkItem {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "fn main() {{}}").unwrap();
        WorkItem {
            id: id.to_string(),
            file: file.reopen().unwrap(),
        }
    }

    #[test]
    fn closed_queue_still_drains_buffered_items() {
        let (sender, receiver) = work_queue(4);
        sender.send(item("src/a.rs")).unwrap();
        sender.send(item("src/b.rs")).unwrap();
        drop(sender);

        assert_eq!(receiver.recv().unwrap().id, "src/a.rs");
        assert_eq!(receiver.recv().unwrap().id, "src/b.rs");
        assert!(receiver.recv().is_err());
    }

    #[test]
    fn full_queue_blocks_instead_of_dropping() {
        let (sender, receiver) = work_queue(1);
        sender.send(item("src/a.rs")).unwrap();

        let producer = std::thread::spawn(move || {
            // Blocks until the consumer below makes room.
            sender.send(item("src/b.rs")).unwrap();
        });

        std::thread::sleep(std::time::Duration::from_millis(50));
        assert_eq!(receiver.recv().unwrap().id, "src/a.rs");
        producer.join().unwrap();
        assert_eq!(receiver.recv().unwrap().id, "src/b.rs");
    }
}
