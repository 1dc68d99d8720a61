pub mod accumulator;
pub mod connectors;
pub mod controller;
pub mod error;
pub mod loader;
pub mod mapper;
pub mod retry;
