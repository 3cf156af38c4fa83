//! Domain and wire types shared by the billing client crates.

pub mod domain;
pub mod error;
pub mod protocol;
