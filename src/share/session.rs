//! Share/poll state machine behind the scan page.
//!
//! Every accepted scan opens a new *generation* with its own cancellation scope. Work started
//! for a generation (the pre-share lookup, the submission, the poll ticker) only writes its
//! result back while that generation is still current, so a late response from an abandoned
//! scan can never reopen a dialog.

use std::sync::{Arc, Mutex, Weak};

use crate::gateway::{fetch_tokens_or_empty, Gateway, ShareRequest};
use crate::geolocation::{locate_best_effort, Coordinates, Geolocator, NoGeolocation};
use crate::payload::{inspect_payload, ScannedIdentity};
use crate::platform::cancel::CancellationToken;
use crate::platform::runtime::{sleep_unless_cancelled, spawn_detached, until_cancelled};
use crate::platform::time::now;
use crate::share::error::{ScanShareError, ScanShareResult};
use crate::share::logger::LOGGER;
use crate::share::settings::ScanShareSettings;
use crate::share::state::{DecodeOutcome, Dialog, SessionState};
use crate::tokens::{TokenBoard, TokenView};
use crate::util::{Listeners, Unsubscribe};

struct SessionInner {
    state: SessionState,
    generation: u64,
    scope: CancellationToken,
}

/// Latest device position, refreshed in the background.
#[derive(Default)]
struct PositionCache {
    coordinates: Option<Coordinates>,
    locating: bool,
}

struct SessionShared {
    gateway: Arc<dyn Gateway>,
    geolocator: Arc<dyn Geolocator>,
    settings: ScanShareSettings,
    inner: Mutex<SessionInner>,
    position: Mutex<PositionCache>,
    listeners: Listeners<SessionState>,
}

impl SessionShared {
    fn state(&self) -> SessionState {
        self.inner.lock().unwrap().state.clone()
    }

    /// Opens a new generation for `state`, revoking everything tied to the previous one.
    fn begin(&self, state: SessionState) -> (u64, CancellationToken) {
        let (generation, scope) = {
            let mut inner = self.inner.lock().unwrap();
            inner.scope.cancel();
            inner.generation += 1;
            inner.scope = CancellationToken::new();
            inner.state = state.clone();
            (inner.generation, inner.scope.clone())
        };
        LOGGER.debug(format!("generation {generation}: {}", state.name()));
        self.listeners.notify(&state);
        (generation, scope)
    }

    /// Stores `state` if `generation` is still current. Returns `false` for stale writes.
    fn transition(&self, generation: u64, state: SessionState) -> bool {
        {
            let mut inner = self.inner.lock().unwrap();
            if inner.generation != generation || inner.scope.is_cancelled() {
                log::debug!(
                    "dropping stale {} update from generation {generation}",
                    state.name()
                );
                return false;
            }
            inner.state = state.clone();
        }
        LOGGER.debug(format!("generation {generation}: {}", state.name()));
        self.listeners.notify(&state);
        true
    }
}

impl Drop for SessionShared {
    fn drop(&mut self) {
        if let Ok(inner) = self.inner.get_mut() {
            inner.scope.cancel();
        }
    }
}

/// One patient's scan & share flow. Clones share the same session.
#[derive(Clone)]
pub struct ScanShareSession {
    shared: Arc<SessionShared>,
}

impl ScanShareSession {
    pub fn new(gateway: Arc<dyn Gateway>) -> Self {
        Self::with_settings(gateway, Arc::new(NoGeolocation), ScanShareSettings::default())
    }

    pub fn with_settings(
        gateway: Arc<dyn Gateway>,
        geolocator: Arc<dyn Geolocator>,
        settings: ScanShareSettings,
    ) -> Self {
        Self {
            shared: Arc::new(SessionShared {
                gateway,
                geolocator,
                settings,
                inner: Mutex::new(SessionInner {
                    state: SessionState::Idle,
                    generation: 0,
                    scope: CancellationToken::new(),
                }),
                position: Mutex::new(PositionCache::default()),
                listeners: Listeners::new(),
            }),
        }
    }

    pub fn settings(&self) -> &ScanShareSettings {
        &self.shared.settings
    }

    pub fn gateway(&self) -> Arc<dyn Gateway> {
        Arc::clone(&self.shared.gateway)
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    pub fn dialog(&self) -> Dialog {
        self.state().dialog()
    }

    pub fn confirm_enabled(&self) -> bool {
        self.state().confirm_enabled()
    }

    pub fn selected_token_view(&self) -> Option<TokenView> {
        self.state().selected_token_view(now())
    }

    /// Last position fix, attached to the next share request.
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.shared.position.lock().unwrap().coordinates
    }

    /// Starts a background position lookup unless one is running or a fix is already known.
    ///
    /// Accepted scans call this too; sharing never waits for the result.
    pub fn locate(&self) {
        spawn_locator(&self.shared);
    }

    /// Called with every new state, outside of the session lock.
    pub fn on_state_changed<F>(&self, listener: F) -> Unsubscribe
    where
        F: Fn(&SessionState) + Send + Sync + 'static,
    {
        self.shared.listeners.add(listener)
    }

    /// Feeds a decoded (or typed) payload into the flow.
    ///
    /// A payload that is not a counter code leaves the session untouched. An accepted one
    /// supersedes whatever was in progress and resolves once the existing-token lookup has
    /// settled on either the token dialog or the consent prompt. If an even newer scan
    /// replaces this one meanwhile, the state reported is the newer scan's.
    pub async fn handle_decoded(&self, text: &str) -> DecodeOutcome {
        let identity = match inspect_payload(text) {
            Ok(identity) => identity,
            Err(rejection) => {
                LOGGER.debug(format!("ignoring scanned text: {rejection}"));
                return DecodeOutcome::Rejected(rejection);
            }
        };

        LOGGER.info(format!("scanned {identity}"));
        spawn_locator(&self.shared);
        let (generation, scope) = self.shared.begin(SessionState::Scanned {
            identity: identity.clone(),
        });
        self.shared.transition(
            generation,
            SessionState::CheckingExisting {
                identity: identity.clone(),
            },
        );

        let lookup = fetch_tokens_or_empty(self.shared.gateway.as_ref());
        if let Some(tokens) = until_cancelled(lookup, &scope).await {
            let board = TokenBoard::at(&tokens, now());
            let next = match board.active_for_facility(identity.facility_id()) {
                Some(view) => SessionState::ShowingExistingToken {
                    identity,
                    token: view.token.clone(),
                },
                None => SessionState::AwaitingConsent {
                    identity,
                    last_error: None,
                },
            };
            self.shared.transition(generation, next);
        }

        DecodeOutcome::Accepted(self.state())
    }

    /// The patient agreed to share. Submits exactly one share request and, on success,
    /// starts polling for the token it produces.
    pub async fn confirm_consent(&self) -> ScanShareResult<SessionState> {
        let (identity, generation, scope) = {
            let mut inner = self.shared.inner.lock().unwrap();
            let identity = match &inner.state {
                SessionState::AwaitingConsent { identity, .. } => identity.clone(),
                SessionState::Submitting { .. } | SessionState::Polling { .. } => {
                    return Err(ScanShareError::SubmissionPending)
                }
                _ => return Err(ScanShareError::NoConsentPending),
            };
            inner.state = SessionState::Submitting {
                identity: identity.clone(),
            };
            (identity, inner.generation, inner.scope.clone())
        };
        self.shared.listeners.notify(&SessionState::Submitting {
            identity: identity.clone(),
        });

        let coordinates = self.coordinates();
        if coordinates.is_none() {
            spawn_locator(&self.shared);
        }

        let request = ShareRequest::new(&identity, coordinates);
        match self.shared.gateway.share_profile(request).await {
            Ok(_ack) => {
                if !self.shared.transition(
                    generation,
                    SessionState::Polling {
                        identity: identity.clone(),
                    },
                ) {
                    return Err(ScanShareError::Superseded);
                }
                LOGGER.info(format!("profile shared with {identity}, waiting for token"));
                spawn_poller(&self.shared, identity, generation, scope);
                Ok(self.state())
            }
            Err(err) => {
                LOGGER.warn(format!("sharing profile with {identity} failed: {err}"));
                let retry = SessionState::AwaitingConsent {
                    identity,
                    last_error: Some(err.clone()),
                };
                if !self.shared.transition(generation, retry) {
                    return Err(ScanShareError::Superseded);
                }
                Err(ScanShareError::Submission(err))
            }
        }
    }

    /// Closes whatever dialog is open and abandons in-flight work. The session stays usable.
    pub fn dismiss(&self) {
        LOGGER.debug("dismissing scan dialog");
        self.shared.begin(SessionState::Idle);
    }

    /// Page teardown: abandons in-flight work and returns to idle.
    pub fn close(&self) {
        LOGGER.debug("closing scan session");
        self.shared.begin(SessionState::Idle);
    }
}

fn spawn_locator(shared: &Arc<SessionShared>) {
    {
        let mut position = shared.position.lock().unwrap();
        if position.locating || position.coordinates.is_some() {
            return;
        }
        position.locating = true;
    }

    let session: Weak<SessionShared> = Arc::downgrade(shared);
    let geolocator = Arc::clone(&shared.geolocator);
    let options = shared.settings.geolocation_options();

    spawn_detached(async move {
        let fix = locate_best_effort(geolocator.as_ref(), options).await;
        if let Some(shared) = session.upgrade() {
            let mut position = shared.position.lock().unwrap();
            position.locating = false;
            if fix.is_some() {
                position.coordinates = fix;
            }
        }
    });
}

fn spawn_poller(
    shared: &Arc<SessionShared>,
    identity: ScannedIdentity,
    generation: u64,
    scope: CancellationToken,
) {
    let session: Weak<SessionShared> = Arc::downgrade(shared);
    let gateway = Arc::clone(&shared.gateway);
    let interval = shared.settings.poll_interval();

    spawn_detached(async move {
        loop {
            let listing = fetch_tokens_or_empty(gateway.as_ref());
            let Some(tokens) = until_cancelled(listing, &scope).await else {
                break;
            };
            if scope.is_cancelled() {
                break;
            }

            let board = TokenBoard::at(&tokens, now());
            if let Some(view) = board.active_for_identity(&identity) {
                if let Some(shared) = session.upgrade() {
                    shared.transition(
                        generation,
                        SessionState::ShowingNewToken {
                            identity: identity.clone(),
                            token: view.token.clone(),
                        },
                    );
                }
                break;
            }

            if session.strong_count() == 0 || !sleep_unless_cancelled(interval, &scope).await {
                break;
            }
        }
        log::debug!("poller for generation {generation} stopped");
    });
}
