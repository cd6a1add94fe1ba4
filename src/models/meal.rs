use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Meal {
    pub id: i64,
    pub name: String,
    // always carries two fractional digits once validated
    #[schema(value_type = String, example = "130.00")]
    pub price: Decimal,
}

/// A validated meal that has not been given an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMeal {
    pub name: String,
    pub price: Decimal,
}

impl NewMeal {
    pub fn with_id(self, id: i64) -> Meal {
        Meal {
            id,
            name: self.name,
            price: self.price,
        }
    }
}
