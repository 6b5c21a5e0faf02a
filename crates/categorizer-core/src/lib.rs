//! # categorizer-core
//!
//! Core types, traits, and abstractions for the episode categorizer.
//!
//! This crate provides the episode record model, the request/response
//! envelopes, the error taxonomy, and the two seams the request handler is
//! built on: [`EpisodeStore`] for the record store and [`Categorizer`] for
//! label computation.

pub mod categorize;
pub mod defaults;
pub mod error;
pub mod logging;
pub mod models;
pub mod traits;

// Re-export commonly used types at crate root
pub use categorize::FixedCategorizer;
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
