//! Cooperative cancellation for the pipeline.
//!
//! The token is backed by a channel that never carries a message: it
//! becomes ready only when the source disconnects it. That lets blocked
//! queue sends and receives observe cancellation through `select!` without
//! polling.

use crossbeam::channel::{bounded, Receiver, Sender, TryRecvError};

/// Owner side. Calling [`CancellationSource::cancel`] (or dropping the
/// source) cancels every associated token.
#[derive(Debug)]
pub struct CancellationSource {
    guard: Option<Sender<()>>,
}

impl CancellationSource {
    pub fn cancel(&mut self) {
        self.guard.take();
    }
}

/// Observer side, cloneable across threads.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    cancelled: Receiver<()>,
}

impl CancellationToken {
    pub fn is_cancelled(&self) -> bool {
        matches!(self.cancelled.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Channel that becomes ready on cancellation, for use in `select!`.
    pub(crate) fn observer(&self) -> &Receiver<()> {
        &self.cancelled
    }
}

/// Creates a linked source/token pair.
pub fn cancellation() -> (CancellationSource, CancellationToken) {
    let (sender, receiver) = bounded(0);
    (
        CancellationSource {
            guard: Some(sender),
        },
        CancellationToken {
            cancelled: receiver,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::select;

    #[test]
    fn token_starts_live() {
        let (_source, token) = cancellation();
        assert!(!token.is_cancelled());
    }

    #[test]
    fn cancel_reaches_all_clones() {
        let (mut source, token) = cancellation();
        let clone = token.clone();
        source.cancel();
        assert!(token.is_cancelled());
        assert!(clone.is_cancelled());
    }

    #[test]
    fn cancellation_unblocks_select() {
        let (mut source, token) = cancellation();
        let waiter = std::thread::spawn(move || {
            select! {
                recv(token.observer()) -> _ => true,
            }
        });
        source.cancel();
        assert!(waiter.join().unwrap());
    }
}
