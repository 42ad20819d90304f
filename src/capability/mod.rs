//! Capability declarations and runtime type keys.
//!
//! # Data Flow
//! ```text
//! trait Database { .. }
//!     → impl Capability for dyn Database {}
//!     → TypeKey::of::<dyn Database>()   (id + name, marked as capability)
//!     → Param::One / Param::All         (how a producer consumes it)
//!     → catalog counts, store slots, resolver lookups all keyed by TypeKey
//! ```
//!
//! # Design Decisions
//! - A capability is declared, never inferred: only types implementing the
//!   `Capability` marker can be produced or consumed
//! - `TypeKey::concrete` exists for descriptors assembled from runtime data;
//!   the catalog rejects such keys at registration
//! - Equality and hashing use the `TypeId` only

use std::any::{type_name, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Marker for types that can be wired between producers.
///
/// Implement it for the trait object of every contract a producer supplies:
///
/// ```ignore
/// pub trait Database: Send + Sync { fn query(&self, sql: &str) -> Rows; }
/// impl Capability for dyn Database {}
/// ```
pub trait Capability: 'static {}

/// Runtime descriptor of a type taking part in wiring.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
    capability: bool,
}

impl TypeKey {
    /// Key of a declared capability.
    pub fn of<C: Capability + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<C>(),
            name: type_name::<C>(),
            capability: true,
        }
    }

    /// Key of an arbitrary type. Never valid as a producer input or output.
    pub fn concrete<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
            capability: false,
        }
    }

    pub fn id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the key was built from a `Capability`.
    pub fn is_capability(&self) -> bool {
        self.capability
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A producer input: one value of a capability, or all of them in order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Param {
    One(TypeKey),
    All(TypeKey),
}

impl Param {
    pub fn one<C: Capability + ?Sized>() -> Self {
        Param::One(TypeKey::of::<C>())
    }

    pub fn all<C: Capability + ?Sized>() -> Self {
        Param::All(TypeKey::of::<C>())
    }

    /// The capability this parameter refers to.
    pub fn key(&self) -> TypeKey {
        match self {
            Param::One(key) | Param::All(key) => *key,
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(self, Param::All(_))
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::One(key) => write!(f, "{key}"),
            Param::All(key) => write!(f, "Vec<{key}>"),
        }
    }
}
