//! User-facing notices for rejected or failed cart operations.
//!
//! Notices are fire-and-forget: the cart never waits on, or learns anything
//! from, how they are displayed.

use std::fmt;

use tokio::sync::mpsc;

/// One-line message for the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Notice {
    /// Requested quantity exceeds available stock (add or update).
    OutOfStock,
    /// Adding a product failed for any other reason.
    AddFailed,
    /// The product to remove was not in the cart.
    RemoveFailed,
    /// Changing a quantity failed for any other reason.
    UpdateFailed,
}

impl Notice {
    /// Text shown to the user.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::OutOfStock => "Requested quantity is out of stock",
            Self::AddFailed => "Failed to add product",
            Self::RemoveFailed => "Failed to remove product",
            Self::UpdateFailed => "Failed to update product quantity",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Somewhere notices are shown.
pub trait Notifier: Send + Sync {
    fn notify(&self, notice: Notice);
}

impl<T: Notifier + ?Sized> Notifier for std::sync::Arc<T> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice);
    }
}

/// Writes notices to the log at warn level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notice: Notice) {
        tracing::warn!(notice = ?notice, "{notice}");
    }
}

/// Forwards notices to a channel a UI can drain.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Notice>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end of its channel.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, notice: Notice) {
        // Nobody listening is fine, the notice is simply dropped.
        if self.tx.send(notice).is_err() {
            tracing::debug!(notice = ?notice, "Notice receiver dropped");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_notice_messages_are_distinct() {
        let notices = [
            Notice::OutOfStock,
            Notice::AddFailed,
            Notice::RemoveFailed,
            Notice::UpdateFailed,
        ];
        for (i, a) in notices.iter().enumerate() {
            for b in notices.iter().skip(i + 1) {
                assert_ne!(a.message(), b.message());
            }
        }
    }

    #[test]
    fn test_notice_display() {
        assert_eq!(
            Notice::OutOfStock.to_string(),
            "Requested quantity is out of stock"
        );
    }

    #[test]
    fn test_channel_notifier_forwards() {
        let (notifier, mut rx) = ChannelNotifier::new();
        notifier.notify(Notice::RemoveFailed);
        notifier.notify(Notice::OutOfStock);

        assert_eq!(rx.try_recv().unwrap(), Notice::RemoveFailed);
        assert_eq!(rx.try_recv().unwrap(), Notice::OutOfStock);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_channel_notifier_without_receiver() {
        let (notifier, rx) = ChannelNotifier::new();
        drop(rx);
        notifier.notify(Notice::AddFailed);
    }
}
