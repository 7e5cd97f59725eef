// 2.0: single-principal role checks. owner is fixed at construction,
// oracle is whatever the owner last set. no rotation history.

use crate::types::Principal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Owner,
    Oracle,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{caller} is not the {role:?}")]
pub struct AccessError {
    pub caller: Principal,
    pub role: Role,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    owner: Principal,
    oracle: Option<Principal>,
}

impl AccessControl {
    pub fn new(owner: Principal) -> Self {
        Self { owner, oracle: None }
    }

    pub fn owner(&self) -> &Principal {
        &self.owner
    }

    pub fn oracle(&self) -> Option<&Principal> {
        self.oracle.as_ref()
    }

    pub fn require_owner(&self, caller: &Principal) -> Result<(), AccessError> {
        if *caller == self.owner {
            Ok(())
        } else {
            Err(AccessError {
                caller: caller.clone(),
                role: Role::Owner,
            })
        }
    }

    // fails when no oracle is configured, even for the owner
    pub fn require_oracle(&self, caller: &Principal) -> Result<(), AccessError> {
        match &self.oracle {
            Some(oracle) if oracle == caller => Ok(()),
            _ => Err(AccessError {
                caller: caller.clone(),
                role: Role::Oracle,
            }),
        }
    }

    pub fn set_oracle(&mut self, caller: &Principal, oracle: Principal) -> Result<(), AccessError> {
        self.require_owner(caller)?;
        self.oracle = Some(oracle);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Principal {
        Principal::new("owner")
    }

    #[test]
    fn owner_check() {
        let acl = AccessControl::new(owner());
        assert!(acl.require_owner(&owner()).is_ok());
        let err = acl.require_owner(&Principal::new("mallory")).unwrap_err();
        assert_eq!(err.role, Role::Owner);
    }

    #[test]
    fn oracle_unset_rejects_everyone() {
        let acl = AccessControl::new(owner());
        assert!(acl.require_oracle(&owner()).is_err());
        assert!(acl.oracle().is_none());
    }

    #[test]
    fn oracle_can_be_reassigned_by_owner_only() {
        let mut acl = AccessControl::new(owner());
        acl.set_oracle(&owner(), Principal::new("feed-1")).unwrap();
        assert!(acl.require_oracle(&Principal::new("feed-1")).is_ok());

        acl.set_oracle(&owner(), Principal::new("feed-2")).unwrap();
        assert!(acl.require_oracle(&Principal::new("feed-1")).is_err());
        assert!(acl.require_oracle(&Principal::new("feed-2")).is_ok());

        assert!(acl
            .set_oracle(&Principal::new("feed-2"), Principal::new("feed-3"))
            .is_err());
        assert_eq!(acl.oracle(), Some(&Principal::new("feed-2")));
    }
}
