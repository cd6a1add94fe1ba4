pub mod meal;
pub mod order;

pub use meal::{Meal, NewMeal};
pub use order::{NewOrder, Order, OrderStatus, OrderView, StatusFilter, total_price};
