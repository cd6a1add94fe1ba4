use chrono::{FixedOffset, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;

use crate::{
    AppState,
    error::ServiceError,
    models::{OrderStatus, OrderView},
};

use super::{order_service, store::OrderQuery};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

pub fn today(tz: FixedOffset) -> NaiveDate {
    Utc::now().with_timezone(&tz).date_naive()
}

/// `[local midnight, next local midnight)` of `date`, in unix seconds.
pub fn day_bounds(date: NaiveDate, tz: FixedOffset) -> (i64, i64) {
    let midnight = date.and_time(NaiveTime::MIN).and_utc().timestamp();
    let start = midnight - i64::from(tz.local_minus_utc());
    (start, start + SECONDS_PER_DAY)
}

pub fn sum_revenue(orders: &[OrderView]) -> Decimal {
    let mut total: Decimal = orders.iter().map(|o| o.total_price).sum();
    total.rescale(2);
    total
}

/// Revenue of the orders paid for on `date` (today when `None`).
pub async fn revenue_for_day(state: &AppState, date: Option<NaiveDate>) -> Result<Decimal, ServiceError> {
    let tz = state.settings.time_zone();
    let date = date.unwrap_or_else(|| today(tz));

    let query = OrderQuery {
        status: Some(OrderStatus::PaidFor),
        created_between: Some(day_bounds(date, tz)),
        ..OrderQuery::default()
    };
    let orders = order_service::list_orders(state, &query).await?;
    let revenue = sum_revenue(&orders);

    tracing::debug!(%date, orders = orders.len(), %revenue, "revenue computed");
    Ok(revenue)
}

/// Parses the `YYYY-MM-DD` form used by the API.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ServiceError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|_| {
        ServiceError::field("date", "Date has wrong format. Use one of these formats instead: YYYY-MM-DD.")
    })
}
