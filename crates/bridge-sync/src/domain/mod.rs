//! # Domain Module
//!
//! Core domain types for the bridge synchronizer.

pub mod entities;
pub mod notification;
pub mod value_objects;

pub use entities::*;
pub use notification::*;
pub use value_objects::*;
