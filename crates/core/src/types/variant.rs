//! Variant selection key for cart line items.

use serde::{Deserialize, Serialize};

/// The variant choice attached to a cart or order line.
///
/// Each dimension is either unset or one value from the product's variant
/// set. Two keys are equal only when both dimensions match, including the
/// both-absent case, so "no selection" merges with "no selection" and
/// nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct VariantKey {
    /// Selected size, if the product has sizes.
    pub size: Option<String>,
    /// Selected color, if the product has colors.
    pub color: Option<String>,
}

impl VariantKey {
    /// A key with no variant selection.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            size: None,
            color: None,
        }
    }

    /// Create a key from optional size and color selections.
    #[must_use]
    pub fn new(size: Option<impl Into<String>>, color: Option<impl Into<String>>) -> Self {
        Self {
            size: size.map(Into::into),
            color: color.map(Into::into),
        }
    }

    /// Whether no dimension is selected.
    #[must_use]
    pub const fn is_unselected(&self) -> bool {
        self.size.is_none() && self.color.is_none()
    }

    /// Human-readable label, e.g. `"Size: M, Color: Black"`.
    ///
    /// Returns `None` when nothing is selected.
    #[must_use]
    pub fn label(&self) -> Option<String> {
        let mut parts = Vec::new();
        if let Some(size) = &self.size {
            parts.push(format!("Size: {size}"));
        }
        if let Some(color) = &self.color {
            parts.push(format!("Color: {color}"));
        }
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}
