//! Shared access primitives for contract modules
//!
//! Single-owner control and caller whitelists, used by the exchange, the
//! custody proxy and the minting pool.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use types::ids::Address;

use crate::errors::AccessError;

/// Single-owner access control.
///
/// Ownership can be transferred to any non-zero address or renounced, after
/// which owner-only operations are permanently unavailable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ownable {
    owner: Option<Address>,
}

impl Ownable {
    pub fn new(owner: Address) -> Self {
        Self { owner: Some(owner) }
    }

    pub fn owner(&self) -> Option<Address> {
        self.owner
    }

    pub fn is_owner(&self, caller: &Address) -> bool {
        self.owner.as_ref() == Some(caller)
    }

    pub fn only_owner(&self, caller: &Address) -> Result<(), AccessError> {
        if self.is_owner(caller) {
            Ok(())
        } else {
            Err(AccessError::NotOwner { caller: *caller })
        }
    }

    pub fn transfer_ownership(
        &mut self,
        caller: &Address,
        new_owner: Address,
    ) -> Result<(), AccessError> {
        self.only_owner(caller)?;
        if new_owner.is_zero() {
            return Err(AccessError::ZeroOwner);
        }
        self.owner = Some(new_owner);
        Ok(())
    }

    pub fn renounce_ownership(&mut self, caller: &Address) -> Result<(), AccessError> {
        self.only_owner(caller)?;
        self.owner = None;
        Ok(())
    }
}

/// Set of callers allowed through a gated entry point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Whitelist {
    members: BTreeSet<Address>,
}

impl Whitelist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if already present.
    pub fn add(&mut self, member: Address) -> bool {
        self.members.insert(member)
    }

    /// Returns `false` if absent.
    pub fn remove(&mut self, member: &Address) -> bool {
        self.members.remove(member)
    }

    pub fn contains(&self, member: &Address) -> bool {
        self.members.contains(member)
    }

    pub fn require(&self, caller: &Address) -> Result<(), AccessError> {
        if self.contains(caller) {
            Ok(())
        } else {
            Err(AccessError::NotWhitelisted { caller: *caller })
        }
    }

    pub fn members(&self) -> impl Iterator<Item = &Address> {
        self.members.iter()
    }
}
