pub mod api;
pub mod batch_size;
pub mod database;
pub mod import;
