//! Derive macros for Sanad DI.
//!
//! See [`Injectable`] for the field and struct attributes it accepts.

pub use sanad_macros::Injectable;
