//! # Sanad Support
//!
//! Shared helpers for the Sanad DI container.
//!
//! This crate provides:
//! - Rendering of resolution chains for error messages
//! - Short type names used as default dependency keys
//! - "Did you mean?" suggestions for unknown type names

pub mod rendering;
