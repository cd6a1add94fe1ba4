use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::Meal;

/// Lifecycle of an order. `PaidFor` is final: the order can no longer be
/// changed or deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    #[default]
    Waiting,
    Ready,
    PaidFor,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 3] = [OrderStatus::Waiting, OrderStatus::Ready, OrderStatus::PaidFor];

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Waiting => "WAITING",
            OrderStatus::Ready => "READY",
            OrderStatus::PaidFor => "PAID_FOR",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderStatus::Waiting => "Waiting",
            OrderStatus::Ready => "Ready",
            OrderStatus::PaidFor => "Paid for",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == code)
    }

    pub fn is_final(self) -> bool {
        self == OrderStatus::PaidFor
    }
}

/// Status criterion of the order search form. `Any` is the "no selection"
/// entry of the dropdown and has no stored counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    Any,
    Only(OrderStatus),
}

impl StatusFilter {
    pub const ANY_LABEL: &'static str = "----------";

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Some(StatusFilter::Any);
        }
        OrderStatus::from_code(raw).map(StatusFilter::Only)
    }

    pub fn code(self) -> &'static str {
        match self {
            StatusFilter::Any => "",
            StatusFilter::Only(s) => s.as_str(),
        }
    }

    pub fn status(self) -> Option<OrderStatus> {
        match self {
            StatusFilter::Any => None,
            StatusFilter::Only(s) => Some(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub id: i64,
    pub table_number: u16,
    // meal ids, no duplicates
    pub items: Vec<i64>,
    pub status: OrderStatus,
    // unix seconds, UTC
    pub created_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub table_number: u16,
    pub items: Vec<i64>,
    pub status: OrderStatus,
    pub created_at: i64,
}

impl NewOrder {
    pub fn with_id(self, id: i64) -> Order {
        Order {
            id,
            table_number: self.table_number,
            items: self.items,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// Sum of the meal prices. An empty slice is worth zero.
pub fn total_price(meals: &[Meal]) -> Decimal {
    let mut total: Decimal = meals.iter().map(|m| m.price).sum();
    total.rescale(2);
    total
}

/// An order joined with its meals, as presented to callers.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OrderView {
    pub id: i64,
    pub table_number: u16,
    pub items: Vec<Meal>,
    #[schema(value_type = String, example = "125.00")]
    pub total_price: Decimal,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

impl OrderView {
    /// Ids missing from `catalog` are skipped; the meal was deleted.
    pub fn assemble(order: &Order, catalog: &HashMap<i64, Meal>) -> Self {
        let items: Vec<Meal> = order
            .items
            .iter()
            .filter_map(|id| catalog.get(id).cloned())
            .collect();

        Self {
            id: order.id,
            table_number: order.table_number,
            total_price: total_price(&items),
            items,
            status: order.status,
            created_at: DateTime::from_timestamp(order.created_at, 0).unwrap_or_default(),
        }
    }
}
