//! Arena identifiers for avatar asset data.
//!
//! Asset graphs reference each other by index into the owning arena so that
//! shared and self-referencing structures (aliased sub-menus, nested state
//! machines) stay representable without reference cycles.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            #[inline]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl From<usize> for $name {
            fn from(index: usize) -> Self {
                Self(index as u32)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}#{}", $label, self.0)
            }
        }
    };
}

arena_id!(
    /// Index into [`AvatarDescriptor::clips`](crate::AvatarDescriptor::clips). Clip identity.
    ClipId,
    "clip"
);
arena_id!(
    /// Index into [`AnimatorController::states`](crate::AnimatorController::states).
    StateId,
    "state"
);
arena_id!(
    /// Index into [`AnimatorController::machines`](crate::AnimatorController::machines).
    MachineId,
    "machine"
);
arena_id!(
    /// Index into [`ExpressionMenuTree::menus`](crate::ExpressionMenuTree::menus).
    MenuId,
    "menu"
);
