//! Seams to the external session and data layers

use crate::error::{GuardError, Result};
use access_types::{IdentityId, IdentityProfile, ProfileLookup};
use std::collections::HashMap;
use std::sync::RwLock;
use tokio::sync::watch;
use tracing::debug;

/// Synchronous read of the signed-in identity
pub trait SessionSource: Send + Sync {
    fn current_identity(&self) -> Option<IdentityId>;
}

/// Subscription-style read of an identity's profile.
///
/// The receiver starts at whatever the source currently knows and is
/// updated whenever the profile changes.
pub trait ProfileSource: Send + Sync {
    fn subscribe(&self, identity: &IdentityId) -> Result<watch::Receiver<ProfileLookup>>;
}

/// Session that always reports the same identity
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    identity: Option<IdentityId>,
}

impl StaticSession {
    pub fn signed_in(identity: IdentityId) -> Self {
        Self {
            identity: Some(identity),
        }
    }

    pub fn signed_out() -> Self {
        Self { identity: None }
    }
}

impl SessionSource for StaticSession {
    fn current_identity(&self) -> Option<IdentityId> {
        self.identity.clone()
    }
}

/// In-memory stand-in for the backend's profile store.
///
/// Every write is pushed to live subscribers of that identity.
/// Subscribing to an identity with no profile yields `NotFound` until one
/// is provisioned.
#[derive(Debug, Default)]
pub struct InMemoryProfileDirectory {
    entries: RwLock<HashMap<IdentityId, watch::Sender<ProfileLookup>>>,
}

impl InMemoryProfileDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a profile
    pub fn provision(&self, profile: IdentityProfile) -> Result<()> {
        let identity = profile.identity_id.clone();
        debug!(identity = %identity, status = ?profile.approval_status, "Provisioning profile");
        self.publish(&identity, ProfileLookup::Found(profile))
    }

    /// Apply a change to an existing profile; returns false if there is none
    pub fn update<F>(&self, identity: &IdentityId, change: F) -> Result<bool>
    where
        F: FnOnce(&mut IdentityProfile),
    {
        let entries = self.entries.read().map_err(|_| GuardError::LockPoisoned)?;
        let Some(sender) = entries.get(identity) else {
            return Ok(false);
        };
        let updated = sender.send_if_modified(|lookup| match lookup {
            ProfileLookup::Found(profile) => {
                change(profile);
                true
            }
            _ => false,
        });
        Ok(updated)
    }

    /// Remove a profile; subscribers see `NotFound`
    pub fn remove(&self, identity: &IdentityId) -> Result<bool> {
        let entries = self.entries.read().map_err(|_| GuardError::LockPoisoned)?;
        let Some(sender) = entries.get(identity) else {
            return Ok(false);
        };
        let previous = sender.send_replace(ProfileLookup::NotFound);
        Ok(matches!(previous, ProfileLookup::Found(_)))
    }

    /// Current profile, if any
    pub fn get(&self, identity: &IdentityId) -> Result<Option<IdentityProfile>> {
        let entries = self.entries.read().map_err(|_| GuardError::LockPoisoned)?;
        Ok(entries
            .get(identity)
            .and_then(|sender| sender.borrow().profile().cloned()))
    }

    /// Lookup state for an identity
    pub fn lookup(&self, identity: &IdentityId) -> Result<ProfileLookup> {
        Ok(self.get(identity)?.into())
    }

    /// Number of provisioned profiles
    pub fn len(&self) -> Result<usize> {
        let entries = self.entries.read().map_err(|_| GuardError::LockPoisoned)?;
        Ok(entries
            .values()
            .filter(|sender| sender.borrow().profile().is_some())
            .count())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn publish(&self, identity: &IdentityId, lookup: ProfileLookup) -> Result<()> {
        let mut entries = self.entries.write().map_err(|_| GuardError::LockPoisoned)?;
        match entries.get(identity) {
            Some(sender) => {
                sender.send_replace(lookup);
            }
            None => {
                let (sender, _) = watch::channel(lookup);
                entries.insert(identity.clone(), sender);
            }
        }
        Ok(())
    }
}

impl ProfileSource for InMemoryProfileDirectory {
    fn subscribe(&self, identity: &IdentityId) -> Result<watch::Receiver<ProfileLookup>> {
        let mut entries = self.entries.write().map_err(|_| GuardError::LockPoisoned)?;
        let sender = entries
            .entry(identity.clone())
            .or_insert_with(|| watch::channel(ProfileLookup::NotFound).0);
        Ok(sender.subscribe())
    }
}
