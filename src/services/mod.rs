// src/services/mod.rs
pub mod api_client;
pub mod cache;
pub mod orchestrator;
