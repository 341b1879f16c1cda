//! # Pharmasite Common
//!
//! Shared data model for the pharmasite content backend: document paths,
//! entity shapes, slug derivation and seed defaults.

pub mod defaults;
pub mod error;
pub mod model;
pub mod path;
pub mod result;
pub mod slug;

pub use error::*;
pub use model::*;
pub use path::DocPath;
pub use result::*;
pub use slug::slugify;
