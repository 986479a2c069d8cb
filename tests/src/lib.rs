//! # Bridge Sync Test Suite
//!
//! Unified test crate for flows that cross module boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── flows.rs      # Deposit and claim hooks against in-memory stores
//!     └── pipeline.rs   # Full stack: push producer, enricher, monitor, poller
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bridge-tests
//! cargo test -p bridge-tests integration::pipeline
//! ```

#![allow(unused_variables)]
#![allow(unused_imports)]
#![allow(dead_code)]

pub mod integration;
