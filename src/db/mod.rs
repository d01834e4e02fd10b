pub mod memory;
pub mod pool;
pub mod postgres;
pub mod schema;
pub mod store;

pub use memory::MemoryDoctorStore;
pub use pool::create_pool;
pub use postgres::PgDoctorStore;
pub use store::DoctorStore;
