use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::{
    error::StoreError,
    models::{Meal, NewMeal, NewOrder, Order},
};

use super::store::{GuardedWrite, OrderQuery, Store};

#[derive(Default)]
struct Tables {
    meals: BTreeMap<i64, Meal>,
    orders: BTreeMap<i64, Order>,
    last_meal_id: i64,
    last_order_id: i64,
}

/// Process-local store. Every write holds the lock for its whole
/// check-then-act sequence.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }

    async fn list_meals(&self) -> Result<Vec<Meal>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.meals.values().cloned().collect())
    }

    async fn get_meal(&self, id: i64) -> Result<Option<Meal>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.meals.get(&id).cloned())
    }

    async fn find_meals(&self, ids: &[i64]) -> Result<Vec<Meal>, StoreError> {
        let t = self.tables.read().await;
        Ok(ids.iter().filter_map(|id| t.meals.get(id).cloned()).collect())
    }

    async fn insert_meal(&self, meal: NewMeal) -> Result<Meal, StoreError> {
        let mut t = self.tables.write().await;
        t.last_meal_id += 1;
        let meal = meal.with_id(t.last_meal_id);
        t.meals.insert(meal.id, meal.clone());
        Ok(meal)
    }

    async fn replace_meal(&self, meal: &Meal) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        match t.meals.get_mut(&meal.id) {
            Some(slot) => {
                *slot = meal.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_meal(&self, id: i64) -> Result<bool, StoreError> {
        let mut t = self.tables.write().await;
        if t.meals.remove(&id).is_none() {
            return Ok(false);
        }
        for order in t.orders.values_mut() {
            order.items.retain(|m| *m != id);
        }
        Ok(true)
    }

    async fn list_orders(&self, query: &OrderQuery) -> Result<Vec<Order>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.orders.values().filter(|o| query.matches(o)).cloned().collect())
    }

    async fn get_order(&self, id: i64) -> Result<Option<Order>, StoreError> {
        let t = self.tables.read().await;
        Ok(t.orders.get(&id).cloned())
    }

    async fn insert_order(&self, order: NewOrder) -> Result<Order, StoreError> {
        let mut t = self.tables.write().await;
        t.last_order_id += 1;
        let order = order.with_id(t.last_order_id);
        t.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn replace_open_order(&self, order: &Order) -> Result<GuardedWrite, StoreError> {
        let mut t = self.tables.write().await;
        match t.orders.get_mut(&order.id) {
            None => Ok(GuardedWrite::Missing),
            Some(stored) if stored.status.is_final() => Ok(GuardedWrite::Finalized),
            Some(stored) => {
                *stored = order.clone();
                Ok(GuardedWrite::Applied)
            }
        }
    }

    async fn delete_open_order(&self, id: i64) -> Result<GuardedWrite, StoreError> {
        let mut t = self.tables.write().await;
        let status = t.orders.get(&id).map(|o| o.status);
        match status {
            None => Ok(GuardedWrite::Missing),
            Some(s) if s.is_final() => Ok(GuardedWrite::Finalized),
            Some(_) => {
                t.orders.remove(&id);
                Ok(GuardedWrite::Applied)
            }
        }
    }
}
