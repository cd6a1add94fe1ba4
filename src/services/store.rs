use async_trait::async_trait;

use crate::{
    error::StoreError,
    models::{Meal, NewMeal, NewOrder, Order, OrderStatus},
};

/// Criteria understood by every backend. `None` means unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderQuery {
    pub table_number: Option<u16>,
    pub status: Option<OrderStatus>,
    // half-open [from, to) in unix seconds
    pub created_between: Option<(i64, i64)>,
}

impl OrderQuery {
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(t) = self.table_number {
            if order.table_number != t {
                return false;
            }
        }
        if let Some(s) = self.status {
            if order.status != s {
                return false;
            }
        }
        if let Some((from, to)) = self.created_between {
            if order.created_at < from || order.created_at >= to {
                return false;
            }
        }
        true
    }
}

/// Result of a write that only happens while the order is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedWrite {
    Applied,
    Missing,
    Finalized,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    async fn list_meals(&self) -> Result<Vec<Meal>, StoreError>;
    async fn get_meal(&self, id: i64) -> Result<Option<Meal>, StoreError>;
    /// Unknown ids are left out of the result.
    async fn find_meals(&self, ids: &[i64]) -> Result<Vec<Meal>, StoreError>;
    async fn insert_meal(&self, meal: NewMeal) -> Result<Meal, StoreError>;
    /// Returns false when no meal has that id.
    async fn replace_meal(&self, meal: &Meal) -> Result<bool, StoreError>;
    /// Also drops the meal from every order that references it.
    async fn delete_meal(&self, id: i64) -> Result<bool, StoreError>;

    /// Orders matching `query`, ascending by id.
    async fn list_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, StoreError>;
    async fn get_order(&self, id: i64) -> Result<Option<Order>, StoreError>;
    async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError>;
    /// Replaces the stored order unless its stored status is final.
    async fn replace_open_order(&self, order: &Order) -> Result<GuardedWrite, StoreError>;
    /// Deletes the order unless its stored status is final.
    async fn delete_open_order(&self, id: i64) -> Result<GuardedWrite, StoreError>;
}
