use crate::api::{decode_identity, Credentials, PortalApi, Registration, TokenSlot, TokenStore};
use crate::config::SessionPolicy;
use crate::error::Result;
use crate::models::Identity;
use crate::stores::UnauthorizedSignal;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Progress of a session check for one slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckState {
    #[default]
    NotChecked,
    Checking,
    Checked,
}

/// Member and admin identities, held in independent slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionState {
    pub member: Option<Identity>,
    pub admin: Option<Identity>,
    pub member_check: CheckState,
    pub admin_check: CheckState,
    pub member_checked_at: Option<Instant>,
    pub admin_checked_at: Option<Instant>,
}

impl SessionState {
    pub fn is_authenticated(&self) -> bool {
        self.member.is_some()
    }

    /// At least one member check has completed (a re-check in flight does not count as loading).
    pub fn member_checked(&self) -> bool {
        self.member_check == CheckState::Checked || self.member_checked_at.is_some()
    }

    pub fn admin_checked(&self) -> bool {
        self.admin_check == CheckState::Checked || self.admin_checked_at.is_some()
    }

    fn slot_mut(&mut self, slot: TokenSlot) -> (&mut Option<Identity>, &mut CheckState, &mut Option<Instant>) {
        match slot {
            TokenSlot::Member => (&mut self.member, &mut self.member_check, &mut self.member_checked_at),
            TokenSlot::Admin => (&mut self.admin, &mut self.admin_check, &mut self.admin_checked_at),
        }
    }

    fn checked_at(&self, slot: TokenSlot) -> Option<Instant> {
        match slot {
            TokenSlot::Member => self.member_checked_at,
            TokenSlot::Admin => self.admin_checked_at,
        }
    }
}

/// Per-slot counters bumped whenever a slot's token is replaced or dropped.
#[derive(Debug, Default)]
struct Generations {
    member: u64,
    admin: u64,
}

impl Generations {
    fn get(&self, slot: TokenSlot) -> u64 {
        match slot {
            TokenSlot::Member => self.member,
            TokenSlot::Admin => self.admin,
        }
    }

    fn bump(&mut self, slot: TokenSlot) {
        match slot {
            TokenSlot::Member => self.member += 1,
            TokenSlot::Admin => self.admin += 1,
        }
    }
}

/// Session/identity store
pub struct SessionStore {
    api: Arc<dyn PortalApi>,
    tokens: Arc<dyn TokenStore>,
    policy: SessionPolicy,
    unauthorized: UnauthorizedSignal,
    unauthorized_seen: AtomicU64,
    // held while token storage and slot state change together
    generations: Mutex<Generations>,
    state: watch::Sender<SessionState>,
}

impl SessionStore {
    pub fn new(
        api: Arc<dyn PortalApi>,
        tokens: Arc<dyn TokenStore>,
        policy: SessionPolicy,
        unauthorized: UnauthorizedSignal,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::default());
        Self {
            api,
            tokens,
            policy,
            unauthorized,
            unauthorized_seen: AtomicU64::new(0),
            generations: Mutex::new(Generations::default()),
            state,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    fn generations(&self) -> MutexGuard<'_, Generations> {
        self.generations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Check the member token against the server. Failures are logged, never returned.
    pub async fn check_session(&self) {
        self.check_slot(TokenSlot::Member).await
    }

    /// Same as [`check_session`](Self::check_session) for the admin slot.
    pub async fn check_admin_session(&self) {
        self.check_slot(TokenSlot::Admin).await
    }

    async fn check_slot(&self, slot: TokenSlot) {
        let Some(token) = self.tokens.get(slot) else {
            debug!("No {} token stored, session is anonymous", slot.key());
            self.finish_check(slot, Some(None));
            return;
        };
        let generation = self.generations().get(slot);

        self.state.send_modify(|state| {
            let (_, check, _) = state.slot_mut(slot);
            *check = CheckState::Checking;
        });

        let outcome = match self.api.check_auth(&token).await {
            Ok(response) => decode_identity(&response.token).map(|identity| (response.token, identity)),
            Err(e) => Err(e),
        };

        let mut generations = self.generations();
        if generations.get(slot) != generation {
            debug!("Discarding stale {} check, the slot changed meanwhile", slot.key());
            return;
        }

        match outcome {
            Ok((fresh_token, identity)) => {
                if let Err(e) = self.tokens.set(slot, &fresh_token) {
                    warn!("Could not persist refreshed {}: {}", slot.key(), e);
                }
                debug!("Session {} belongs to user {}", slot.key(), identity.id);
                self.finish_check(slot, Some(Some(identity)));
            }
            Err(e) if e.is_unauthorized() => {
                warn!("Stored {} was rejected: {}", slot.key(), e);
                generations.bump(slot);
                if let Err(e) = self.tokens.remove(slot) {
                    warn!("Could not remove rejected {}: {}", slot.key(), e);
                }
                self.finish_check(slot, Some(None));
            }
            Err(e) => {
                warn!("Session check for {} failed: {}", slot.key(), e);
                self.finish_check(slot, None);
            }
        }
    }

    /// Mark a slot checked. `Some(identity)` replaces the slot, `None` keeps it.
    fn finish_check(&self, slot: TokenSlot, identity: Option<Option<Identity>>) {
        self.state.send_modify(|state| {
            let (current, check, checked_at) = state.slot_mut(slot);
            if let Some(identity) = identity {
                *current = identity;
            }
            *check = CheckState::Checked;
            *checked_at = Some(Instant::now());
        });
    }

    /// Exchange credentials for a member token.
    pub async fn login(&self, email: &str, password: &str) -> Result<Identity> {
        let response = self.api.login(&Credentials::new(email, password)).await?;
        self.accept_token(TokenSlot::Member, &response.token)
    }

    /// Create a pending account and sign it in.
    pub async fn register(&self, registration: &Registration) -> Result<Identity> {
        let response = self.api.register(registration).await?;
        let identity = self.accept_token(TokenSlot::Member, &response.token)?;
        info!("Registered {} with status {}", identity.email, identity.status.as_str());
        Ok(identity)
    }

    /// Exchange credentials for an admin token.
    pub async fn login_admin(&self, email: &str, password: &str) -> Result<Identity> {
        let response = self
            .api
            .admin_login(&Credentials::new(email, password))
            .await?;
        self.accept_token(TokenSlot::Admin, &response.token)
    }

    fn accept_token(&self, slot: TokenSlot, token: &str) -> Result<Identity> {
        let identity = decode_identity(token)?;
        let mut generations = self.generations();
        generations.bump(slot);
        self.tokens.set(slot, token)?;
        self.finish_check(slot, Some(Some(identity.clone())));
        drop(generations);
        info!("Signed in user {} ({})", identity.id, slot.key());
        Ok(identity)
    }

    /// Drop both tokens and both identities, whichever was active.
    pub fn logout(&self) {
        let mut generations = self.generations();
        for slot in [TokenSlot::Member, TokenSlot::Admin] {
            generations.bump(slot);
            if let Err(e) = self.tokens.remove(slot) {
                warn!("Could not remove {}: {}", slot.key(), e);
            }
            self.finish_check(slot, Some(None));
        }
        drop(generations);
        info!("Signed out");
    }

    /// Under [`SessionPolicy::RecheckOnUnauthorized`], re-check both slots in the
    /// background whenever a store reports a 401. Needs a running tokio runtime.
    pub fn listen_for_unauthorized(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        if self.policy != SessionPolicy::RecheckOnUnauthorized {
            return None;
        }
        let Ok(runtime) = Handle::try_current() else {
            warn!("No tokio runtime, 401 responses will not trigger a session re-check");
            return None;
        };

        let store = Arc::downgrade(self);
        let mut raised = self.unauthorized.subscribe();
        Some(runtime.spawn(async move {
            while raised.changed().await.is_ok() {
                let Some(store) = store.upgrade() else {
                    break;
                };
                store.ensure_fresh().await;
            }
        }))
    }

    /// Re-check sessions when the configured policy says the cached decode is stale.
    pub async fn ensure_fresh(&self) {
        match self.policy {
            SessionPolicy::TrustDecoded => {}
            SessionPolicy::RecheckAfter(interval) => {
                let snapshot = self.snapshot();
                for slot in [TokenSlot::Member, TokenSlot::Admin] {
                    let stale = snapshot
                        .checked_at(slot)
                        .map(|at| at.elapsed() >= interval)
                        .unwrap_or(true);
                    if stale {
                        self.check_slot(slot).await;
                    }
                }
            }
            SessionPolicy::RecheckOnUnauthorized => {
                let raised = self.unauthorized.count();
                let seen = self.unauthorized_seen.swap(raised, Ordering::SeqCst);
                if raised > seen {
                    debug!("Unauthorized response observed, re-checking sessions");
                    self.check_slot(TokenSlot::Member).await;
                    self.check_slot(TokenSlot::Admin).await;
                }
            }
        }
    }
}
