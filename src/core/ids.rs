//! Identifier newtypes.
//!
//! Everything the engine hands out a handle for gets its own id type so
//! that a listener id can never be passed where a card instance is
//! expected:
//!
//! - [`InstanceId`]: one card in play
//! - [`ListenerId`]: one registered tag trigger
//! - [`AreaId`]: one placement area on the board
//! - [`DecisionId`]: one issued decision request
//!
//! ```
//! use terraform_engine::core::InstanceId;
//!
//! let id = InstanceId::new(7);
//! assert_eq!(id.raw(), 7);
//! assert_eq!(id.to_string(), "Instance(7)");
//! ```

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u32);

        impl $name {
            /// Wrap a raw id.
            #[must_use]
            pub const fn new(id: u32) -> Self {
                Self(id)
            }

            /// Get the raw id value.
            #[must_use]
            pub const fn raw(self) -> u32 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($label, "({})"), self.0)
            }
        }

        impl From<u32> for $name {
            fn from(id: u32) -> Self {
                Self(id)
            }
        }
    };
}

id_type!(
    /// A card that has entered play. Allocated by the engine on commit.
    InstanceId,
    "Instance"
);

id_type!(
    /// A live `OnOwnTagPlayed` listener. Ids grow monotonically, so id
    /// order is registration order.
    ListenerId,
    "Listener"
);

id_type!(
    /// A placement area on the board.
    AreaId,
    "Area"
);

id_type!(
    /// An issued decision request. A response must quote the id of the
    /// request it answers.
    DecisionId,
    "Decision"
);
