use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Change-signal fan-out for a store.
///
/// Subscribers receive a unit value whenever the owning store mutates its
/// state; they re-read the store to pick up the new snapshot. Senders whose
/// receiver has been dropped are pruned on the next notification.
#[derive(Clone, Default)]
pub struct Notifier {
    subscribers: Arc<Mutex<Vec<UnboundedSender<()>>>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> UnboundedReceiver<()> {
        let (tx, rx) = unbounded_channel();
        self.subscribers.lock().push(tx);
        rx
    }

    pub fn notify(&self) {
        self.subscribers.lock().retain(|tx| tx.send(()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }
}
