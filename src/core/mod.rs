//! Core modules for the inventory runtime.
//!
//! Storage plumbing, configuration, validation and other shared primitives
//! live here. The per-entity handlers in [`crate::inventory`] are built on top.

pub mod assets;
pub mod broker;
pub mod config;
pub mod db;
pub mod error;
pub mod pool;
pub mod schemas;
pub mod store;
pub mod time;
pub mod validate;
