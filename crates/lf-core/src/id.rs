use lasso::{Spur, ThreadedRodeo};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

/// Global string interner shared by every identifier kind.
static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::default);

/// Declares an interned identifier: 4 bytes, `Copy`, O(1) equality and
/// hashing, ordered by its string value so maps keyed by it serialize
/// deterministically.
macro_rules! interned_id {
    ($(#[$meta:meta])* $name:ident, $sigil:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash)]
        pub struct $name(Spur);

        impl $name {
            /// Intern a string, or return the existing handle for it.
            pub fn intern(s: &str) -> Self {
                $name(INTERNER.get_or_intern(s))
            }

            /// Resolve back to a string slice.
            pub fn as_str(&self) -> &str {
                INTERNER.resolve(&self.0)
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                if self.0 == other.0 {
                    return Ordering::Equal;
                }
                self.as_str().cmp(other.as_str())
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($sigil, "{}"), self.as_str())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::intern(s)
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                Ok(Self::intern(&s))
            }
        }
    };
}

interned_id!(
    /// Stable identifier of a movable item (workstation or furniture).
    ItemId,
    "@"
);

interned_id!(
    /// Identifier of a group of items inside one room.
    GroupId,
    "#"
);

interned_id!(
    /// Identifier of a room (laboratory), e.g. `cl1`.
    RoomId,
    "room:"
);

impl ItemId {
    /// First `{prefix}-{n}` id (n counting from 1) for which `taken` is false.
    ///
    /// Callers pass a predicate over the room's existing ids, so ids stay
    /// unique even across layouts reloaded from storage.
    pub fn next_free(prefix: &str, taken: impl Fn(ItemId) -> bool) -> Self {
        let mut n: u64 = 1;
        loop {
            let candidate = Self::intern(&format!("{prefix}-{n}"));
            if !taken(candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}

impl GroupId {
    /// Same scheme as [`ItemId::next_free`], for group ids.
    pub fn next_free(prefix: &str, taken: impl Fn(GroupId) -> bool) -> Self {
        let mut n: u64 = 1;
        loop {
            let candidate = Self::intern(&format!("{prefix}-{n}"));
            if !taken(candidate) {
                return candidate;
            }
            n += 1;
        }
    }
}
