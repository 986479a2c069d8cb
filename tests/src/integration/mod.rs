//! Cross-module integration tests.

pub mod flows;
pub mod pipeline;
