use crate::{
    AppState,
    error::{FieldErrors, ServiceError, add_error},
    models::{Order, OrderView, StatusFilter},
};

use super::{order_service, store::OrderQuery};

/// Criteria of the order search form. Both parts are optional.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchCriteria {
    pub table_number: Option<i64>,
    pub status: StatusFilter,
}

pub fn parse_criteria(table_raw: &str, status_raw: &str) -> Result<SearchCriteria, FieldErrors> {
    let mut errs = FieldErrors::new();

    let table_raw = table_raw.trim();
    let table_number = if table_raw.is_empty() {
        None
    } else {
        match table_raw.parse::<i64>() {
            // zero is what an untouched number input submits
            Ok(0) => None,
            Ok(n) => Some(n),
            Err(_) => {
                add_error(&mut errs, "table_number", "Enter a whole number.");
                None
            }
        }
    };

    let status = match StatusFilter::parse(status_raw) {
        Some(s) => s,
        None => {
            add_error(
                &mut errs,
                "status",
                format!("Select a valid choice. {} is not one of the available choices.", status_raw.trim()),
            );
            StatusFilter::Any
        }
    };

    if !errs.is_empty() {
        return Err(errs);
    }
    Ok(SearchCriteria { table_number, status })
}

pub async fn search_orders(state: &AppState, criteria: SearchCriteria) -> Result<Vec<OrderView>, ServiceError> {
    let table_number = match criteria.table_number {
        Some(t) => match u16::try_from(t) {
            Ok(t) => Some(t),
            // no stored order can sit at such a table
            Err(_) => return Ok(Vec::new()),
        },
        None => None,
    };

    let query = OrderQuery {
        table_number,
        status: criteria.status.status(),
        ..OrderQuery::default()
    };
    order_service::list_orders(state, &query).await
}

/// Splits a free-text query into lowercase terms.
pub fn search_terms(q: &str) -> Vec<String> {
    q.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Every term must appear in the table number or the status code.
pub fn matches_terms(order: &Order, terms: &[String]) -> bool {
    let table = order.table_number.to_string();
    let status = order.status.as_str().to_lowercase();
    terms
        .iter()
        .all(|t| table.contains(t.as_str()) || status.contains(t.as_str()))
}

pub async fn text_search(state: &AppState, q: &str) -> Result<Vec<OrderView>, ServiceError> {
    let terms = search_terms(q);
    let orders: Vec<Order> = state
        .store
        .list_orders(&OrderQuery::default())
        .await?
        .into_iter()
        .filter(|o| matches_terms(o, &terms))
        .collect();
    order_service::hydrate(state, &orders).await
}
