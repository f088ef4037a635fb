//! Ownership policy.
//!
//! Each record kind declares whether it is owned by the actor that created it
//! or shared by everyone. The store turns that declaration into a predicate on
//! the owner column of every scoped query, so a record another actor owns is
//! indistinguishable from one that does not exist.

use crate::models::{ActorId, Doctor, Mapping, Patient};

/// How a record kind is isolated between actors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Visible and mutable only through the actor stored in `column`.
    Owned { column: &'static str },
    /// Visible and mutable by every authenticated actor.
    Shared,
}

/// Whose view a store operation runs under.
#[derive(Debug, Clone, Copy)]
pub enum Scope<'a> {
    /// Only records the actor may access.
    Actor(&'a ActorId),
    /// Every record. For integrity checks that must see across actors, such as
    /// assignment uniqueness.
    Unscoped,
}

impl Ownership {
    /// The `(column, actor)` equality a query must carry under `scope`, if any.
    pub fn predicate(&self, scope: Scope<'_>) -> Option<(&'static str, String)> {
        match (*self, scope) {
            (Ownership::Owned { column }, Scope::Actor(actor)) => {
                Some((column, actor.as_str().to_string()))
            }
            _ => None,
        }
    }
}

/// A record kind with a declared ownership model.
pub trait AccessControlled {
    const OWNERSHIP: Ownership;

    /// The owning actor, for owned kinds.
    fn owner(&self) -> Option<&ActorId>;
}

/// Whether `actor` may read, update or delete `entity`.
pub fn can_access<E: AccessControlled>(actor: &ActorId, entity: &E) -> bool {
    match E::OWNERSHIP {
        Ownership::Shared => true,
        Ownership::Owned { .. } => entity.owner() == Some(actor),
    }
}

impl Scope<'_> {
    /// Whether a record returned under this scope is one the scope allows.
    pub fn permits<E: AccessControlled>(&self, entity: &E) -> bool {
        match self {
            Scope::Actor(actor) => can_access(actor, entity),
            Scope::Unscoped => true,
        }
    }
}

impl AccessControlled for Patient {
    const OWNERSHIP: Ownership = Ownership::Owned {
        column: "created_by",
    };

    fn owner(&self) -> Option<&ActorId> {
        Some(&self.created_by)
    }
}

impl AccessControlled for Doctor {
    const OWNERSHIP: Ownership = Ownership::Shared;

    fn owner(&self) -> Option<&ActorId> {
        None
    }
}

impl AccessControlled for Mapping {
    const OWNERSHIP: Ownership = Ownership::Owned {
        column: "assigned_by",
    };

    fn owner(&self) -> Option<&ActorId> {
        Some(&self.assigned_by)
    }
}
