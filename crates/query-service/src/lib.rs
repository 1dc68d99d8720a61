//! Read side over the loaded legal units: lookups, paged listings, and the
//! per-activity aggregate, all rendered as JSON-LD documents.

pub mod error;
pub mod jsonld;
pub mod mysql;
pub mod ports;
pub mod service;
pub mod view;
