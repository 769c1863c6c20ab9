use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Namespace for ids derived from catalog names, so a built-in power keeps
/// the same id every time the catalog is loaded.
const CATALOG_NAMESPACE: Uuid = Uuid::from_u128(0x6c0f_9e1a_52d4_4b8e_9a3c_1d2e_7f40_b5a1);

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Stable id for a catalog entry identified by `key`.
            pub fn derived(key: &str) -> Self {
                Self(Uuid::new_v5(&CATALOG_NAMESPACE, key.as_bytes()))
            }

            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(CharacterId);
define_id!(DisciplineId);
define_id!(PowerId);
define_id!(BackgroundId);
define_id!(EntryId);
