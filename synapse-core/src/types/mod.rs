//! Core types shared across the gateway crates

pub mod message;
pub mod profile;
