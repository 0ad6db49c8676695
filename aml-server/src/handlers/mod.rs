//! HTTP handlers

pub mod health;
pub mod page;
pub mod predict;
