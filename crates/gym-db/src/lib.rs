pub mod pool;
pub mod rows;
pub mod store;

pub use pool::{create_pool, run_migrations};
pub use store::PgStore;
