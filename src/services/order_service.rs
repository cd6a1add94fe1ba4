use std::collections::HashMap;

use chrono::Utc;

use crate::{
    AppState,
    error::{FieldErrors, ServiceError, add_error},
    models::{Meal, NewOrder, Order, OrderStatus, OrderView},
};

use super::{
    WriteMode,
    guard::{self, GuardViolation, GuardedAction},
    store::{GuardedWrite, OrderQuery},
};

const REQUIRED: &str = "This field is required.";

/// Unvalidated order fields as received from either surface.
#[derive(Debug, Clone, Default)]
pub struct OrderInput {
    pub table_number: Option<i64>,
    pub items: Option<Vec<i64>>,
    pub status: Option<String>,
    // fields whose raw value could not be converted, with the reason
    pub rejected: FieldErrors,
}

struct Resolved {
    table_number: u16,
    items: Vec<i64>,
    status: OrderStatus,
}

pub fn check_table_number(raw: i64, max_tables: u16) -> Result<u16, String> {
    if raw < 1 {
        return Err("Ensure this value is greater than or equal to 1.".into());
    }
    if raw > i64::from(max_tables) {
        return Err(format!(
            "Ensure this value is less than or equal to {max_tables}."
        ));
    }
    u16::try_from(raw).map_err(|_| "Ensure this value is within range.".to_string())
}

pub fn check_status(raw: &str) -> Result<OrderStatus, String> {
    OrderStatus::from_code(raw.trim()).ok_or_else(|| format!("\"{raw}\" is not a valid choice."))
}

/// Drops repeated ids, keeping the first occurrence.
pub fn distinct_items(ids: &[i64]) -> Vec<i64> {
    let mut out: Vec<i64> = Vec::with_capacity(ids.len());
    for id in ids {
        if !out.contains(id) {
            out.push(*id);
        }
    }
    out
}

async fn resolve(
    state: &AppState,
    base: Option<&Order>,
    input: OrderInput,
    mode: WriteMode,
) -> Result<Resolved, ServiceError> {
    let OrderInput {
        table_number,
        items,
        status,
        rejected,
    } = input;
    let mut errs = rejected;
    let fallback = if mode == WriteMode::Partial { base } else { None };

    let table_number = match (table_number, fallback) {
        (None, _) if errs.contains_key("table_number") => None,
        (Some(raw), _) => check_table_number(raw, state.settings.max_tables)
            .map_err(|e| add_error(&mut errs, "table_number", e))
            .ok(),
        (None, Some(o)) => Some(o.table_number),
        (None, None) => {
            add_error(&mut errs, "table_number", REQUIRED);
            None
        }
    };

    let items = match (items, fallback) {
        (None, _) if errs.contains_key("items") => None,
        (Some(ids), _) => {
            let ids = distinct_items(&ids);
            if ids.is_empty() {
                add_error(&mut errs, "items", "This list may not be empty.");
                None
            } else {
                let known = state.store.find_meals(&ids).await?;
                let missing: Vec<i64> = ids
                    .iter()
                    .copied()
                    .filter(|id| !known.iter().any(|m| m.id == *id))
                    .collect();
                for id in &missing {
                    add_error(
                        &mut errs,
                        "items",
                        format!("Invalid pk \"{id}\" - object does not exist."),
                    );
                }
                missing.is_empty().then_some(ids)
            }
        }
        (None, Some(o)) => Some(o.items.clone()),
        (None, None) => {
            add_error(&mut errs, "items", REQUIRED);
            None
        }
    };

    // status is optional even on a full write
    let status = match status {
        Some(raw) => check_status(&raw).map_err(|e| add_error(&mut errs, "status", e)).ok(),
        None if errs.contains_key("status") => None,
        None => Some(base.map(|o| o.status).unwrap_or_default()),
    };

    match (table_number, items, status) {
        (Some(table_number), Some(items), Some(status)) if errs.is_empty() => Ok(Resolved {
            table_number,
            items,
            status,
        }),
        _ => Err(ServiceError::Validation(errs)),
    }
}

/// Joins orders with their meals, fetching each referenced meal once.
pub async fn hydrate(state: &AppState, orders: &[Order]) -> Result<Vec<OrderView>, ServiceError> {
    let mut ids: Vec<i64> = orders.iter().flat_map(|o| o.items.iter().copied()).collect();
    ids.sort_unstable();
    ids.dedup();

    let catalog: HashMap<i64, Meal> = state
        .store
        .find_meals(&ids)
        .await?
        .into_iter()
        .map(|m| (m.id, m))
        .collect();

    Ok(orders.iter().map(|o| OrderView::assemble(o, &catalog)).collect())
}

async fn hydrate_one(state: &AppState, order: &Order) -> Result<OrderView, ServiceError> {
    let mut views = hydrate(state, std::slice::from_ref(order)).await?;
    views.pop().ok_or(ServiceError::NotFound("order"))
}

pub async fn list_orders(state: &AppState, query: &OrderQuery) -> Result<Vec<OrderView>, ServiceError> {
    let orders = state.store.list_orders(query).await?;
    hydrate(state, &orders).await
}

async fn load(state: &AppState, id: i64) -> Result<Order, ServiceError> {
    state
        .store
        .get_order(id)
        .await?
        .ok_or(ServiceError::NotFound("order"))
}

pub async fn get_order(state: &AppState, id: i64) -> Result<OrderView, ServiceError> {
    let order = load(state, id).await?;
    hydrate_one(state, &order).await
}

/// Loads an order that is about to be edited or deleted, refusing paid ones.
pub async fn get_mutable_order(
    state: &AppState,
    id: i64,
    action: GuardedAction,
) -> Result<OrderView, ServiceError> {
    let order = load(state, id).await?;
    guard::ensure_mutable(&order, action)?;
    hydrate_one(state, &order).await
}

pub async fn create_order(state: &AppState, input: OrderInput) -> Result<OrderView, ServiceError> {
    let r = resolve(state, None, input, WriteMode::Full).await?;

    let order = state
        .store
        .insert_order(NewOrder {
            table_number: r.table_number,
            items: r.items,
            status: r.status,
            created_at: Utc::now().timestamp(),
        })
        .await?;

    tracing::info!(
        order_id = order.id,
        table_number = order.table_number,
        items = order.items.len(),
        "order created"
    );
    hydrate_one(state, &order).await
}

pub async fn update_order(
    state: &AppState,
    id: i64,
    input: OrderInput,
    mode: WriteMode,
) -> Result<OrderView, ServiceError> {
    let current = load(state, id).await?;
    guard::ensure_mutable(&current, GuardedAction::Update)?;

    let r = resolve(state, Some(&current), input, mode).await?;
    let next = Order {
        id,
        table_number: r.table_number,
        items: r.items,
        status: r.status,
        created_at: current.created_at,
    };

    match state.store.replace_open_order(&next).await? {
        GuardedWrite::Applied => {}
        GuardedWrite::Missing => return Err(ServiceError::NotFound("order")),
        GuardedWrite::Finalized => return Err(paid_meanwhile(id, GuardedAction::Update)),
    }

    tracing::info!(order_id = id, status = next.status.as_str(), "order updated");
    hydrate_one(state, &next).await
}

pub async fn delete_order(state: &AppState, id: i64) -> Result<(), ServiceError> {
    let current = load(state, id).await?;
    guard::ensure_mutable(&current, GuardedAction::Delete)?;

    match state.store.delete_open_order(id).await? {
        GuardedWrite::Applied => {}
        GuardedWrite::Missing => return Err(ServiceError::NotFound("order")),
        GuardedWrite::Finalized => return Err(paid_meanwhile(id, GuardedAction::Delete)),
    }

    tracing::info!(order_id = id, "order deleted");
    Ok(())
}

// another request paid the order between our read and the conditional write
fn paid_meanwhile(order_id: i64, action: GuardedAction) -> ServiceError {
    tracing::warn!(order_id, ?action, "order was paid while the request was in flight");
    ServiceError::Guard(GuardViolation { order_id, action })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_number_range() {
        assert_eq!(check_table_number(1, 10).unwrap(), 1);
        assert_eq!(check_table_number(10, 10).unwrap(), 10);
        assert!(check_table_number(0, 10).unwrap_err().contains("greater than or equal to 1"));
        assert!(check_table_number(-1, 10).is_err());
        assert!(check_table_number(11, 10).unwrap_err().contains("less than or equal to 10"));
    }

    #[test]
    fn empty_status_is_not_storable() {
        assert_eq!(check_status("READY").unwrap(), OrderStatus::Ready);
        assert_eq!(check_status("").unwrap_err(), "\"\" is not a valid choice.");
        assert!(check_status("UNKNOWN").is_err());
    }

    #[test]
    fn items_behave_as_a_set() {
        assert_eq!(distinct_items(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(distinct_items(&[]).is_empty());
    }
}
