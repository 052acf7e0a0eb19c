use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ServiceError;

/// Lifecycle shared by purchase orders and transactions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Pending,
    Confirmed,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub const fn ordered() -> [Self; 5] {
        [
            Self::Pending,
            Self::Confirmed,
            Self::Shipped,
            Self::Delivered,
            Self::Cancelled,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Shipped => "SHIPPED",
            Self::Delivered => "DELIVERED",
            Self::Cancelled => "CANCELLED",
        }
    }

    pub const fn can_transition_to(self, next: OrderStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Confirmed)
                | (Self::Pending, Self::Cancelled)
                | (Self::Confirmed, Self::Shipped)
                | (Self::Confirmed, Self::Cancelled)
                | (Self::Shipped, Self::Delivered)
        )
    }

    pub fn transition(self, next: OrderStatus) -> Result<OrderStatus, ServiceError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(ServiceError::InvalidTransition {
                from: self,
                to: next,
            })
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Cancelled)
    }

    /// Statuses whose amounts count towards statistics and stock.
    pub const fn is_committed(self) -> bool {
        matches!(self, Self::Confirmed | Self::Shipped | Self::Delivered)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for OrderStatus {
    type Err = ServiceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ordered()
            .into_iter()
            .find(|status| status.label().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ServiceError::Validation(format!("unknown status '{value}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_path_is_allowed() {
        let status = OrderStatus::Pending
            .transition(OrderStatus::Confirmed)
            .and_then(|status| status.transition(OrderStatus::Shipped))
            .and_then(|status| status.transition(OrderStatus::Delivered))
            .expect("happy path transitions");
        assert_eq!(status, OrderStatus::Delivered);
        assert!(status.is_terminal());
    }

    #[test]
    fn cancellation_only_before_shipping() {
        assert!(OrderStatus::Pending.can_transition_to(OrderStatus::Cancelled));
        assert!(OrderStatus::Confirmed.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Shipped.can_transition_to(OrderStatus::Cancelled));
        assert!(!OrderStatus::Delivered.can_transition_to(OrderStatus::Cancelled));
    }

    #[test]
    fn skipping_or_repeating_states_is_rejected() {
        match OrderStatus::Pending.transition(OrderStatus::Delivered) {
            Err(ServiceError::InvalidTransition { from, to }) => {
                assert_eq!(from, OrderStatus::Pending);
                assert_eq!(to, OrderStatus::Delivered);
            }
            other => panic!("expected invalid transition, got {other:?}"),
        }
        assert!(!OrderStatus::Confirmed.can_transition_to(OrderStatus::Confirmed));
        assert!(!OrderStatus::Cancelled.can_transition_to(OrderStatus::Pending));
    }

    #[test]
    fn parses_labels_case_insensitively() {
        assert_eq!("shipped".parse::<OrderStatus>().ok(), Some(OrderStatus::Shipped));
        assert!("lost".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn serializes_as_screaming_case() {
        let json = serde_json::to_string(&OrderStatus::Cancelled).expect("serializes");
        assert_eq!(json, "\"CANCELLED\"");
    }
}
