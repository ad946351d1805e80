//! Stable surrogate identifiers for entities the player refers to.
//!
//! Ids are allocated from a single counter on the estate, so they are unique
//! across all entity kinds and never reused within a game.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, "#{}"), self.0)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> u64 {
                id.0
            }
        }
    };
}

entity_id!(
    /// A harvested lot of grapes in the player's inventory.
    GrapeLotId,
    "grapes"
);
entity_id!(
    /// A lot of processed must waiting for a fermentation vessel.
    MustLotId,
    "must"
);
entity_id!(
    /// A lot of wine fermenting or aging in a vessel.
    WineLotId,
    "wine"
);
entity_id!(
    /// A vessel owned by the winery.
    VesselId,
    "vessel"
);
entity_id!(
    /// A bottled wine in the cellar.
    BottledWineId,
    "bottled"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_kind() {
        assert_eq!(VesselId(3).to_string(), "vessel#3");
        assert_eq!(WineLotId(12).to_string(), "wine#12");
    }

    #[test]
    fn serializes_as_plain_number() {
        assert_eq!(serde_json::to_string(&GrapeLotId(7)).unwrap(), "7");
        let back: MustLotId = serde_json::from_str("9").unwrap();
        assert_eq!(back, MustLotId(9));
    }
}
