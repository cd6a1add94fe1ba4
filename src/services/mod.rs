pub mod db_init;
pub mod guard;
pub mod memory_store;
pub mod mongo_store;
pub mod store;

pub mod meal_service;
pub mod order_service;
pub mod revenue_service;
pub mod search_service;

/// Whether omitted fields of an update keep their stored values (`Partial`)
/// or are reported as missing (`Full`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Full,
    Partial,
}
