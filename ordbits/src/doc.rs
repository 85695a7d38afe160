//! Guides and examples.

pub mod example;
pub mod overview;
