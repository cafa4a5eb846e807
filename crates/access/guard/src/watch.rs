//! Reactive access watch
//!
//! Holds the latest guard inputs and republishes the outcome every time
//! one of them changes. Each change re-runs the evaluator from scratch;
//! the newest inputs always win.

use crate::error::{GuardError, Result};
use crate::outcome::GuardOutcome;
use crate::source::{ProfileSource, SessionSource};
use access_policy::AccessEvaluator;
use access_types::{AccessVerdict, IdentityId, ProfileLookup, RouteRequirement};
use std::sync::{Arc, Mutex};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

/// Everything the evaluation depends on
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GuardInputs {
    pub identity: Option<IdentityId>,
    pub profile: ProfileLookup,
    pub requirement: RouteRequirement,
}

/// Inputs together with the outcome computed from them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardSnapshot {
    pub inputs: GuardInputs,
    /// `None` when there is no identity to evaluate
    pub verdict: Option<AccessVerdict>,
    pub outcome: GuardOutcome,
}

impl GuardSnapshot {
    fn compute(evaluator: &AccessEvaluator, inputs: GuardInputs) -> Self {
        if inputs.identity.is_none() {
            return Self {
                inputs,
                verdict: None,
                outcome: GuardOutcome::RedirectToSignIn,
            };
        }
        let verdict = evaluator.explain(&inputs.profile, &inputs.requirement);
        Self {
            outcome: GuardOutcome::from_verdict(&verdict),
            verdict: Some(verdict),
            inputs,
        }
    }
}

struct Shared {
    evaluator: AccessEvaluator,
    state: watch::Sender<GuardSnapshot>,
}

impl Shared {
    /// Modify inputs and recompute under the channel lock
    fn apply<F>(&self, change: F) -> bool
    where
        F: FnOnce(&mut GuardInputs) -> bool,
    {
        self.state.send_if_modified(|snapshot| {
            let mut inputs = snapshot.inputs.clone();
            if !change(&mut inputs) {
                return false;
            }
            let next = GuardSnapshot::compute(&self.evaluator, inputs);
            let changed = next != *snapshot;
            *snapshot = next;
            changed
        })
    }
}

/// Observer over identity, profile and requirement inputs
pub struct AccessWatch {
    shared: Arc<Shared>,
    follower: Mutex<Option<JoinHandle<()>>>,
}

impl AccessWatch {
    /// Start with no identity and the given requirement
    pub fn new(requirement: RouteRequirement) -> Self {
        Self::with_evaluator(AccessEvaluator::new(), requirement)
    }

    pub fn with_evaluator(evaluator: AccessEvaluator, requirement: RouteRequirement) -> Self {
        let inputs = GuardInputs {
            requirement,
            ..GuardInputs::default()
        };
        let snapshot = GuardSnapshot::compute(&evaluator, inputs);
        let (state, _) = watch::channel(snapshot);
        Self {
            shared: Arc::new(Shared { evaluator, state }),
            follower: Mutex::new(None),
        }
    }

    /// Receiver that sees every republished snapshot
    pub fn subscribe(&self) -> watch::Receiver<GuardSnapshot> {
        self.shared.state.subscribe()
    }

    pub fn snapshot(&self) -> GuardSnapshot {
        self.shared.state.borrow().clone()
    }

    pub fn outcome(&self) -> GuardOutcome {
        self.shared.state.borrow().outcome.clone()
    }

    /// Switch identity. A new identity starts with its profile loading.
    pub fn set_identity(&self, identity: Option<IdentityId>) -> bool {
        self.shared.apply(|inputs| {
            if inputs.identity == identity {
                return false;
            }
            inputs.identity = identity;
            inputs.profile = ProfileLookup::Loading;
            true
        })
    }

    pub fn set_profile(&self, profile: ProfileLookup) -> bool {
        self.shared.apply(|inputs| {
            if inputs.profile == profile {
                return false;
            }
            inputs.profile = profile;
            true
        })
    }

    pub fn set_requirement(&self, requirement: RouteRequirement) -> bool {
        self.shared.apply(|inputs| {
            if inputs.requirement == requirement {
                return false;
            }
            inputs.requirement = requirement;
            true
        })
    }

    /// Read the session, then follow that identity's profile subscription.
    ///
    /// Fails with [`GuardError::NoRuntime`] outside a tokio runtime.
    pub fn attach(&self, session: &dyn SessionSource, profiles: &dyn ProfileSource) -> Result<()> {
        let identity = session.current_identity();
        self.set_identity(identity.clone());
        match identity {
            Some(identity) => {
                let receiver = profiles.subscribe(&identity)?;
                self.follow(identity, receiver)
            }
            None => {
                self.stop_following()?;
                Ok(())
            }
        }
    }

    /// Forward a profile subscription for `identity` into the watch.
    ///
    /// Replaces any previous subscription. Updates arriving after the
    /// identity has changed are ignored.
    pub fn follow(
        &self,
        identity: IdentityId,
        mut receiver: watch::Receiver<ProfileLookup>,
    ) -> Result<()> {
        let runtime =
            Handle::try_current().map_err(|e| GuardError::NoRuntime(e.to_string()))?;
        let shared = Arc::clone(&self.shared);

        let initial = receiver.borrow_and_update().clone();
        apply_for(&shared, &identity, initial);

        let handle = runtime.spawn(async move {
            while receiver.changed().await.is_ok() {
                let lookup = receiver.borrow_and_update().clone();
                apply_for(&shared, &identity, lookup);
            }
            debug!(identity = %identity, "Profile subscription ended");
        });

        let mut follower = self.follower.lock().map_err(|_| GuardError::LockPoisoned)?;
        if let Some(previous) = follower.replace(handle) {
            previous.abort();
        }
        Ok(())
    }

    /// Stop forwarding profile updates
    pub fn stop_following(&self) -> Result<bool> {
        let mut follower = self.follower.lock().map_err(|_| GuardError::LockPoisoned)?;
        Ok(match follower.take() {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        })
    }

    /// Wait until the published outcome satisfies `predicate`
    pub async fn wait_for<F>(&self, mut predicate: F) -> Result<GuardOutcome>
    where
        F: FnMut(&GuardOutcome) -> bool,
    {
        let mut receiver = self.subscribe();
        let snapshot = receiver
            .wait_for(|snapshot| predicate(&snapshot.outcome))
            .await
            .map_err(|_| GuardError::Closed)?;
        Ok(snapshot.outcome.clone())
    }
}

impl Drop for AccessWatch {
    fn drop(&mut self) {
        if let Ok(mut follower) = self.follower.lock() {
            if let Some(handle) = follower.take() {
                handle.abort();
            }
        }
    }
}

fn apply_for(shared: &Shared, identity: &IdentityId, lookup: ProfileLookup) -> bool {
    shared.apply(|inputs| {
        if inputs.identity.as_ref() != Some(identity) || inputs.profile == lookup {
            return false;
        }
        inputs.profile = lookup;
        true
    })
}
