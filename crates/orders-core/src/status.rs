//! Order status enum.
//!
//! `status` is a closed five-value set. Writes are validated against it
//! before any statement reaches the store; reads pass it through untouched.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle status of an order.
///
/// This is a flat enum: any status may move to any other via
/// `update_order_status`. Terminal states are not distinguished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
    PendingPayment,
    Paid,
    Shipped,
    Completed,
    Cancelled,
}

impl OrderStatus {
    /// All valid statuses, in declaration order.
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::PendingPayment,
        OrderStatus::Paid,
        OrderStatus::Shipped,
        OrderStatus::Completed,
        OrderStatus::Cancelled,
    ];

    /// The wire/storage spelling of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::PendingPayment => "pending-payment",
            OrderStatus::Paid => "paid",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// The full set of valid spellings, for schema enums and error messages.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|s| s.as_str()).collect()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing a status outside the closed set.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid order status: {0:?} (expected one of pending-payment, paid, shipped, completed, cancelled)")]
pub struct InvalidStatus(pub String);

impl FromStr for OrderStatus {
    type Err = InvalidStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|v| v.as_str() == s)
            .copied()
            .ok_or_else(|| InvalidStatus(s.to_string()))
    }
}
