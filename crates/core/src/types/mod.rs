//! Core types for Luxe Commerce.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod slug;
pub mod status;
pub mod variant;

pub use id::*;
pub use money::{Money, MoneyError};
pub use slug::{Slug, SlugError};
pub use status::*;
pub use variant::VariantKey;
