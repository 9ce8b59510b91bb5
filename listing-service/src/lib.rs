//! Listing service: per-user watermark settings, LLM listing copy and zip packaging.

pub mod config;
pub mod dtos;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
pub mod utils;
