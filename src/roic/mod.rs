// src/roic/mod.rs
pub mod driver;
pub mod models;
pub mod navigator;

pub use driver::{HttpPageDriver, PageDriver};
pub use navigator::{Navigator, WaitPolicy};
