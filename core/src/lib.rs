pub mod db;
pub mod error;
pub mod food_db;
pub mod models;
pub mod stats;
pub mod store;

pub use stats::{bmi, today};
pub use store::{Collection, Record, Store, StoreOptions};
