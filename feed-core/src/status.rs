//! Delivery status lifecycle.
//!
//! Status only moves forward along `Sent -> Delivered -> Read`. Reports of an
//! earlier status (late or reordered acknowledgements) are ignored silently.

use wallfeed_types::{DeliveryStatus, Message};

/// Status every locally created message starts in.
pub const INITIAL_STATUS: DeliveryStatus = DeliveryStatus::Sent;

/// Outcome of applying a status report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusChange {
    /// The status moved forward.
    Advanced {
        /// Previous status.
        from: DeliveryStatus,
        /// New status.
        to: DeliveryStatus,
    },
    /// The report was equal to or older than the current status.
    Unchanged,
}

impl StatusChange {
    /// Whether the status moved.
    pub fn is_advanced(&self) -> bool {
        matches!(self, Self::Advanced { .. })
    }
}

/// Combine the current status with an incoming report.
///
/// Returns the resulting status (`max` of the two) and what happened.
pub fn apply(current: DeliveryStatus, incoming: DeliveryStatus) -> (DeliveryStatus, StatusChange) {
    if incoming > current {
        (
            incoming,
            StatusChange::Advanced {
                from: current,
                to: incoming,
            },
        )
    } else {
        (current, StatusChange::Unchanged)
    }
}

/// Apply a status report to a message in place.
pub fn advance(message: &mut Message, incoming: DeliveryStatus) -> StatusChange {
    let (next, change) = apply(message.status, incoming);
    message.status = next;
    change
}
