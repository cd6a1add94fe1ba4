//! Paid orders are frozen: no update, no delete.
//!
//! Every mutation path of both surfaces calls [`ensure_mutable`] with the
//! order as currently stored, never with the incoming payload, so moving an
//! order *into* `PAID_FOR` is allowed while touching it afterwards is not.

use thiserror::Error;

use crate::models::Order;

pub const UPDATE_PROHIBITED_MESSAGE: &str = "Changing a paid order is prohibited.";
pub const DELETE_PROHIBITED_MESSAGE: &str = "Deleting a paid order is prohibited.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedAction {
    Update,
    Delete,
}

impl GuardedAction {
    pub fn message(self) -> &'static str {
        match self {
            GuardedAction::Update => UPDATE_PROHIBITED_MESSAGE,
            GuardedAction::Delete => DELETE_PROHIBITED_MESSAGE,
        }
    }

    /// Short key used for the flash notice cookie.
    pub fn notice_key(self) -> &'static str {
        match self {
            GuardedAction::Update => "update_prohibited",
            GuardedAction::Delete => "delete_prohibited",
        }
    }

    pub fn from_notice_key(key: &str) -> Option<Self> {
        match key {
            "update_prohibited" => Some(GuardedAction::Update),
            "delete_prohibited" => Some(GuardedAction::Delete),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{}", .action.message())]
pub struct GuardViolation {
    pub order_id: i64,
    pub action: GuardedAction,
}

pub fn ensure_mutable(stored: &Order, action: GuardedAction) -> Result<(), GuardViolation> {
    if stored.status.is_final() {
        tracing::warn!(order_id = stored.id, ?action, "refused mutation of a paid order");
        return Err(GuardViolation {
            order_id: stored.id,
            action,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::OrderStatus;

    fn order(status: OrderStatus) -> Order {
        Order {
            id: 11,
            table_number: 2,
            items: vec![1],
            status,
            created_at: 0,
        }
    }

    #[test]
    fn open_orders_pass() {
        for status in [OrderStatus::Waiting, OrderStatus::Ready] {
            assert!(ensure_mutable(&order(status), GuardedAction::Update).is_ok());
            assert!(ensure_mutable(&order(status), GuardedAction::Delete).is_ok());
        }
    }

    #[test]
    fn paid_orders_are_refused_with_action_message() {
        let paid = order(OrderStatus::PaidFor);

        let err = ensure_mutable(&paid, GuardedAction::Update).unwrap_err();
        assert_eq!(err.to_string(), "Changing a paid order is prohibited.");
        assert_eq!(err.order_id, 11);

        let err = ensure_mutable(&paid, GuardedAction::Delete).unwrap_err();
        assert_eq!(err.to_string(), "Deleting a paid order is prohibited.");
    }

    #[test]
    fn notice_keys_round_trip() {
        for action in [GuardedAction::Update, GuardedAction::Delete] {
            assert_eq!(GuardedAction::from_notice_key(action.notice_key()), Some(action));
        }
        assert_eq!(GuardedAction::from_notice_key("other"), None);
    }
}
