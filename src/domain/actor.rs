//! Actors and roles.
//!
//! The authentication layer resolves the current user; the core only ever
//! sees an explicit [`Actor`] threaded through each operation - never an
//! ambient per-request lookup.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Role an actor can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Creates purchases and confirms final acceptance.
    Customer,
    /// Prices, shops, and marks items done/skipped.
    Operator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Operator => "operator",
        }
    }
}

/// An authenticated actor with its role set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: Uuid,
    pub roles: Vec<Role>,
}

impl Actor {
    pub fn new(id: Uuid, roles: Vec<Role>) -> Self {
        Self { id, roles }
    }

    /// Actor holding only the customer role.
    pub fn customer(id: Uuid) -> Self {
        Self::new(id, vec![Role::Customer])
    }

    /// Actor holding only the operator role.
    pub fn operator(id: Uuid) -> Self {
        Self::new(id, vec![Role::Operator])
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }
}
