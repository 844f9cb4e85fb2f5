// src/handlers/mod.rs
pub mod dashboard;
pub mod error;
pub mod generate;
