use rust_decimal::Decimal;

use crate::{
    AppState,
    error::{FieldErrors, ServiceError, add_error},
    models::{Meal, NewMeal},
};

use super::WriteMode;

pub const NAME_MAX_CHARS: usize = 200;
// six digits in total, two of them after the point
const MAX_WHOLE_DIGITS: u32 = 4;
const PRICE_SCALE: u32 = 2;

const REQUIRED: &str = "This field is required.";

#[derive(Debug, Clone, Default)]
pub struct MealInput {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    // fields whose raw value could not be converted, with the reason
    pub rejected: FieldErrors,
}

pub fn check_name(raw: &str) -> Result<String, String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err("This field may not be blank.".into());
    }
    if name.chars().count() > NAME_MAX_CHARS {
        return Err(format!(
            "Ensure this field has no more than {NAME_MAX_CHARS} characters."
        ));
    }
    Ok(name.to_string())
}

/// Returns the price rescaled to exactly two fractional digits.
pub fn check_price(price: Decimal) -> Result<Decimal, String> {
    if price < Decimal::ZERO {
        return Err("Ensure this value is greater than or equal to 0.".into());
    }

    let normalized = price.normalize();
    if normalized.scale() > PRICE_SCALE {
        return Err(format!(
            "Ensure that there are no more than {PRICE_SCALE} decimal places."
        ));
    }
    if normalized.trunc() >= Decimal::from(10_u32.pow(MAX_WHOLE_DIGITS)) {
        return Err(format!(
            "Ensure that there are no more than {MAX_WHOLE_DIGITS} digits before the decimal point."
        ));
    }

    let mut p = normalized.abs();
    p.rescale(PRICE_SCALE);
    Ok(p)
}

/// Parses a price typed into a form field.
pub fn parse_price(raw: &str) -> Result<Decimal, String> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|_| "A valid number is required.".to_string())
}

fn resolve(base: Option<&Meal>, input: MealInput, mode: WriteMode) -> Result<NewMeal, FieldErrors> {
    let MealInput { name, price, rejected } = input;
    let mut errs = rejected;
    let fallback = if mode == WriteMode::Partial { base } else { None };

    let name = match (name, fallback) {
        (None, _) if errs.contains_key("name") => None,
        (Some(raw), _) => check_name(&raw).map_err(|e| add_error(&mut errs, "name", e)).ok(),
        (None, Some(m)) => Some(m.name.clone()),
        (None, None) => {
            add_error(&mut errs, "name", REQUIRED);
            None
        }
    };

    let price = match (price, fallback) {
        (None, _) if errs.contains_key("price") => None,
        (Some(p), _) => check_price(p).map_err(|e| add_error(&mut errs, "price", e)).ok(),
        (None, Some(m)) => Some(m.price),
        (None, None) => {
            add_error(&mut errs, "price", REQUIRED);
            None
        }
    };

    match (name, price) {
        (Some(name), Some(price)) if errs.is_empty() => Ok(NewMeal { name, price }),
        _ => Err(errs),
    }
}

pub async fn list_meals(state: &AppState) -> Result<Vec<Meal>, ServiceError> {
    Ok(state.store.list_meals().await?)
}

pub async fn get_meal(state: &AppState, id: i64) -> Result<Meal, ServiceError> {
    state
        .store
        .get_meal(id)
        .await?
        .ok_or(ServiceError::NotFound("meal"))
}

pub async fn create_meal(state: &AppState, input: MealInput) -> Result<Meal, ServiceError> {
    let draft = resolve(None, input, WriteMode::Full).map_err(ServiceError::Validation)?;
    let meal = state.store.insert_meal(draft).await?;

    tracing::info!(meal_id = meal.id, name = %meal.name, price = %meal.price, "meal created");
    Ok(meal)
}

pub async fn update_meal(
    state: &AppState,
    id: i64,
    input: MealInput,
    mode: WriteMode,
) -> Result<Meal, ServiceError> {
    let current = get_meal(state, id).await?;
    let meal = resolve(Some(&current), input, mode)
        .map_err(ServiceError::Validation)?
        .with_id(id);

    if !state.store.replace_meal(&meal).await? {
        return Err(ServiceError::NotFound("meal"));
    }

    tracing::info!(meal_id = id, "meal updated");
    Ok(meal)
}

pub async fn delete_meal(state: &AppState, id: i64) -> Result<(), ServiceError> {
    if !state.store.delete_meal(id).await? {
        return Err(ServiceError::NotFound("meal"));
    }

    tracing::info!(meal_id = id, "meal deleted");
    Ok(())
}
