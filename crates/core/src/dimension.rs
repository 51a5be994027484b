//! Dimension identifiers.
//!
//! The host addresses worlds by name. The core only ever deals with two of
//! them: the vanilla overworld that portals lead back to, and the warped
//! dimension whose terrain this workspace generates.

use serde::{Deserialize, Serialize};

/// One of the two linked worlds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DimensionId {
    /// The vanilla overworld.
    Overworld,
    /// The generated warped dimension.
    Warped,
}

impl DimensionId {
    /// Default host world name for this dimension.
    pub const fn default_world_name(self) -> &'static str {
        match self {
            Self::Overworld => "world",
            Self::Warped => "warped_dimension",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_world_names() {
        assert_eq!(DimensionId::Overworld.default_world_name(), "world");
        assert_eq!(DimensionId::Warped.default_world_name(), "warped_dimension");
    }
}
