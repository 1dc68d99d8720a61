#![allow(dead_code)]

pub mod doubles;
pub mod utils;

mod live;
mod transfer;
