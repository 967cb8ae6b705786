//! Push reconciliation controller
//!
//! Folds all push-relevant signals (account set, folder configuration,
//! backend capability, sync policy, connectivity, background permission)
//! into one target state and drives the per-account listeners and the
//! keep-alive service to match it.
//!
//! Features:
//! - Single-worker event queue: every signal enqueues a pass, one task runs them
//! - Set-diff based start/stop of listeners and per-account folder watches
//! - Edge-triggered keep-alive service control with explicit suppression reasons

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::BackgroundSync;
use crate::signals::accounts::AccountStore;
use crate::signals::backend::BackendStore;
use crate::signals::connectivity::{ConnectivityEvent, ConnectivityMonitor};
use crate::signals::folders::FolderStore;
use crate::signals::permission::{
    AutoSyncManager, BackgroundPermissionManager, BootCompleteManager,
};
use crate::signals::settings::SettingsStore;
use crate::types::error::{PushError, Result};
use crate::types::{Account, AccountId};

use super::listener::{PushListener, PushListenerFactory};
use super::service::PushServiceManager;

/// Why push is currently forced off for all accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SuppressionReason {
    /// The system-wide auto-sync switch is off and the policy respects it.
    SystemAutoSync,
    /// The user set the background-sync policy to never.
    BackgroundSyncNever,
    /// No usable network.
    NetworkUnavailable,
}

/// Diagnostic snapshot of the controller's state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PushStatus {
    pub running_accounts: Vec<AccountId>,
    pub watched_accounts: Vec<AccountId>,
    pub services_started: bool,
    pub suppression: Option<SuppressionReason>,
    pub last_pass: Option<DateTime<Utc>>,
}

/// Everything the controller consumes from the rest of the application.
pub struct PushDeps {
    pub accounts: Arc<dyn AccountStore>,
    pub folders: Arc<dyn FolderStore>,
    pub backends: Arc<dyn BackendStore>,
    pub settings: Arc<dyn SettingsStore>,
    pub connectivity: Arc<dyn ConnectivityMonitor>,
    pub permission: Arc<dyn BackgroundPermissionManager>,
    pub auto_sync: Arc<dyn AutoSyncManager>,
    pub boot: Arc<dyn BootCompleteManager>,
    pub service: Arc<dyn PushServiceManager>,
    pub factory: Arc<dyn PushListenerFactory>,
}

/// Internal event type; every signal source is mapped onto one of these and
/// sent through the controller's queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PushEvent {
    Init,
    AccountsChanged,
    BackgroundSyncChanged,
    PushFoldersChanged(AccountId),
    AutoSyncChanged,
    ConnectivityChanged,
    ConnectivityLost,
    BackendChanged(AccountId),
}

/// State owned exclusively by the controller; mutated only from
/// reconciliation passes on the worker task, read through short-lived locks.
#[derive(Default)]
struct PushState {
    listeners: HashMap<AccountId, Arc<dyn PushListener>>,
    folder_watches: HashMap<AccountId, JoinHandle<()>>,
    auto_sync_watch: Option<JoinHandle<()>>,
    connectivity_watch: Option<JoinHandle<()>>,
    services_started: bool,
    suppression: Option<SuppressionReason>,
    last_pass: Option<DateTime<Utc>>,
}

/// Starts and stops per-account push listeners as accounts, folder settings,
/// and global conditions change. Manages the keep-alive service.
pub struct PushController {
    deps: PushDeps,
    state: Mutex<PushState>,
    events: flume::Sender<PushEvent>,
    events_rx: Mutex<Option<flume::Receiver<PushEvent>>>,
    initialized: AtomicBool,
    // handed to the worker task at init
    weak: Weak<PushController>,
}

impl PushController {
    pub fn new(deps: PushDeps) -> Arc<Self> {
        let (events, events_rx) = flume::unbounded();

        Arc::new_cyclic(|weak| Self {
            deps,
            state: Mutex::new(PushState::default()),
            events,
            events_rx: Mutex::new(Some(events_rx)),
            initialized: AtomicBool::new(false),
            weak: weak.clone(),
        })
    }

    /// Initialize the controller. Idempotent; only the first call has any
    /// effect. After this, signal events are observed until process exit.
    ///
    /// Only call once it is safe to perform the keep-alive service's startup
    /// side effects.
    pub fn init(&self) {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return;
        }

        info!("Initializing push controller");

        self.spawn_account_forwarder();
        self.spawn_settings_forwarder();
        self.spawn_backend_forwarder();
        self.spawn_worker();

        let _ = self.events.send(PushEvent::Init);
    }

    /// Whether a push listener is currently running for the account.
    pub fn is_push_active(&self, account_uuid: AccountId) -> bool {
        self.state.lock().unwrap().listeners.contains_key(&account_uuid)
    }

    /// Hook for the backend registry: the account's backend instance was
    /// replaced, so its listener must be discarded before the next pass.
    pub fn on_backend_changed(&self, account_uuid: AccountId) {
        let _ = self.events.send(PushEvent::BackendChanged(account_uuid));
    }

    /// Diagnostic snapshot.
    pub fn status(&self) -> PushStatus {
        let state = self.state.lock().unwrap();

        let mut running_accounts: Vec<AccountId> = state.listeners.keys().copied().collect();
        running_accounts.sort();
        let mut watched_accounts: Vec<AccountId> = state.folder_watches.keys().copied().collect();
        watched_accounts.sort();

        PushStatus {
            running_accounts,
            watched_accounts,
            services_started: state.services_started,
            suppression: state.suppression,
            last_pass: state.last_pass,
        }
    }

    fn spawn_account_forwarder(&self) {
        let rx = self.deps.accounts.subscribe();
        let events = self.events.clone();
        tokio::spawn(async move {
            while rx.recv_async().await.is_ok() {
                if events.send(PushEvent::AccountsChanged).is_err() {
                    break;
                }
            }
        });
    }

    fn spawn_settings_forwarder(&self) {
        let rx = self.deps.settings.subscribe();
        let events = self.events.clone();
        let mut last = self.deps.settings.background_sync();
        tokio::spawn(async move {
            while let Ok(policy) = rx.recv_async().await {
                if policy == last {
                    continue;
                }
                last = policy;
                if events.send(PushEvent::BackgroundSyncChanged).is_err() {
                    break;
                }
            }
        });
    }

    fn spawn_backend_forwarder(&self) {
        let rx = self.deps.backends.subscribe_changes();
        let events = self.events.clone();
        tokio::spawn(async move {
            while let Ok(uuid) = rx.recv_async().await {
                if events.send(PushEvent::BackendChanged(uuid)).is_err() {
                    break;
                }
            }
        });
    }

    fn spawn_worker(&self) {
        let rx = match self.events_rx.lock().unwrap().take() {
            Some(rx) => rx,
            None => return,
        };

        let controller = match self.weak.upgrade() {
            Some(controller) => controller,
            None => return,
        };
        tokio::spawn(async move {
            while let Ok(event) = rx.recv_async().await {
                controller.handle_event(event);
            }
        });
    }

    fn handle_event(&self, event: PushEvent) {
        debug!("Push event: {:?}", event);

        match event {
            PushEvent::BackendChanged(uuid) => {
                let listener = self.state.lock().unwrap().listeners.remove(&uuid);
                if let Some(listener) = listener {
                    info!("Backend changed, stopping push listener for account: {}", uuid);
                    if let Err(e) = listener.stop() {
                        warn!("Failed to stop push listener for account {}: {}", uuid, e);
                    }
                }
                self.run_pass(event);
            }
            PushEvent::ConnectivityChanged => {
                {
                    let state = self.state.lock().unwrap();
                    for (uuid, listener) in &state.listeners {
                        debug!("Reconnecting push listener for account: {}", uuid);
                        listener.reconnect();
                    }
                }
                self.run_pass(event);
            }
            _ => self.run_pass(event),
        }
    }

    fn run_pass(&self, trigger: PushEvent) {
        if let Err(e) = self.reconcile() {
            error!("Reconciliation pass aborted (trigger: {:?}): {}", trigger, e);
        }
    }

    /// One reconciliation pass. Recomputes the target account set from the
    /// current signal values and drives listeners, folder watches, and the
    /// keep-alive service to match.
    fn reconcile(&self) -> Result<()> {
        debug!("Reconciling push state");

        self.check_background_permission();

        let push_capable: Vec<_> = self
            .deps
            .accounts
            .accounts()
            .into_iter()
            .filter(|account| self.deps.backends.is_push_capable(account))
            .collect();

        let auto_sync_disabled = self.deps.auto_sync.is_auto_sync_disabled();
        let sync_never = self.deps.settings.background_sync() == BackgroundSync::Never;
        let network_unavailable = !self.deps.connectivity.is_network_available();

        let eligible: Vec<_> = push_capable
            .iter()
            .filter(|account| self.deps.folders.has_push_enabled_folder(account))
            .cloned()
            .collect();

        let suppression = if auto_sync_disabled {
            Some(SuppressionReason::SystemAutoSync)
        } else if sync_never {
            Some(SuppressionReason::BackgroundSyncNever)
        } else if network_unavailable {
            Some(SuppressionReason::NetworkUnavailable)
        } else {
            None
        };

        let target: &[Account] = if suppression.is_some() { &[] } else { &eligible };

        let mut state = self.state.lock().unwrap();

        self.sync_listeners(&mut state, target)?;
        self.sync_folder_watches(&mut state, &push_capable);

        let desired = keep_alive_desired(
            !eligible.is_empty(),
            auto_sync_disabled,
            network_unavailable,
            !state.listeners.is_empty(),
        );
        self.apply_keep_alive(&mut state, desired);

        if let Some(reason) = suppression {
            debug!("Push suppressed: {:?}", reason);
        }
        debug!(
            "Running push listeners: {:?}",
            state.listeners.keys().collect::<Vec<_>>()
        );

        state.suppression = suppression;
        state.last_pass = Some(Utc::now());
        Ok(())
    }

    /// If the platform no longer allows background services, clear push
    /// configuration everywhere so eligibility computes to empty from stored
    /// state. A failing query counts as revoked.
    fn check_background_permission(&self) {
        let allowed = match self.deps.permission.can_run_background_services() {
            Ok(allowed) => allowed,
            Err(e) => {
                warn!("Background permission query failed, treating as revoked: {}", e);
                false
            }
        };

        if !allowed {
            info!("Background services not permitted, disabling push for all accounts");
            for account in self.deps.accounts.accounts() {
                self.deps.folders.disable_push(&account);
            }
        }
    }

    /// Diff the running-listener map against the target set; stops are issued
    /// before starts.
    fn sync_listeners(&self, state: &mut PushState, target: &[Account]) -> Result<()> {
        let desired: HashSet<AccountId> = target.iter().map(|a| a.uuid).collect();
        let current: HashSet<AccountId> = state.listeners.keys().copied().collect();
        let diff = diff_keys(&current, &desired);

        if !diff.remove.is_empty() {
            debug!("Stopping push listeners for accounts: {:?}", diff.remove);
            for uuid in &diff.remove {
                if let Some(listener) = state.listeners.remove(uuid) {
                    if let Err(e) = listener.stop() {
                        warn!("Failed to stop push listener for account {}: {}", uuid, e);
                    }
                }
            }
        }

        if !diff.add.is_empty() {
            debug!("Starting push listeners for accounts: {:?}", diff.add);
            for uuid in &diff.add {
                let account = self
                    .deps
                    .accounts
                    .account(*uuid)
                    .ok_or_else(|| PushError::AccountNotFound(uuid.to_string()))?;

                let listener = self.deps.factory.create(&account);
                state.listeners.insert(*uuid, Arc::clone(&listener));

                if let Err(e) = listener.start() {
                    error!("Failed to start push listener for account {}: {}", uuid, e);
                    state.listeners.remove(uuid);
                    // stop() is safe even when start() never completed
                    let _ = listener.stop();
                }
            }
        }

        Ok(())
    }

    /// Keep one folder watch per push-capable account; same diff shape as the
    /// listener reconciliation.
    fn sync_folder_watches(&self, state: &mut PushState, push_capable: &[Account]) {
        let desired: HashSet<AccountId> = push_capable.iter().map(|a| a.uuid).collect();
        let current: HashSet<AccountId> = state.folder_watches.keys().copied().collect();
        let diff = diff_keys(&current, &desired);

        for uuid in &diff.remove {
            debug!("Stopping push-folder watch for account: {}", uuid);
            if let Some(watch) = state.folder_watches.remove(uuid) {
                watch.abort();
            }
        }

        for account in push_capable {
            if !diff.add.contains(&account.uuid) {
                continue;
            }
            debug!("Starting push-folder watch for account: {}", account.uuid);

            let rx = self.deps.folders.subscribe_push_enabled(account);
            let events = self.events.clone();
            let uuid = account.uuid;
            let watch = tokio::spawn(async move {
                while rx.recv_async().await.is_ok() {
                    if events.send(PushEvent::PushFoldersChanged(uuid)).is_err() {
                        break;
                    }
                }
            });
            state.folder_watches.insert(uuid, watch);
        }
    }

    /// Apply the keep-alive decision, acting only on edges. While the service
    /// stays up, the auto-sync watch registration is still re-evaluated: the
    /// policy can flip without the service going down.
    fn apply_keep_alive(&self, state: &mut PushState, desired: bool) {
        if desired == state.services_started {
            if desired {
                self.sync_auto_sync_watch(state);
            }
            return;
        }

        if desired {
            self.start_services(state);
        } else {
            self.stop_services(state);
        }
    }

    fn start_services(&self, state: &mut PushState) {
        info!("Starting keep-alive service");
        self.deps.service.start();
        self.deps.boot.enable_receiver();
        self.sync_auto_sync_watch(state);

        if state.connectivity_watch.is_none() {
            let rx = self.deps.connectivity.subscribe();
            let events = self.events.clone();
            state.connectivity_watch = Some(tokio::spawn(async move {
                while let Ok(event) = rx.recv_async().await {
                    let event = match event {
                        ConnectivityEvent::Changed => PushEvent::ConnectivityChanged,
                        ConnectivityEvent::Lost => PushEvent::ConnectivityLost,
                    };
                    if events.send(event).is_err() {
                        break;
                    }
                }
            }));
        }
        self.deps.connectivity.start();

        state.services_started = true;
    }

    fn stop_services(&self, state: &mut PushState) {
        info!("Stopping keep-alive service");
        self.deps.service.stop();
        self.deps.boot.disable_receiver();

        if let Some(watch) = state.auto_sync_watch.take() {
            watch.abort();
        }
        if let Some(watch) = state.connectivity_watch.take() {
            watch.abort();
        }
        self.deps.connectivity.stop();

        state.services_started = false;
    }

    fn sync_auto_sync_watch(&self, state: &mut PushState) {
        if self.deps.auto_sync.respect_system_auto_sync() {
            if state.auto_sync_watch.is_none() {
                let rx = self.deps.auto_sync.subscribe();
                let events = self.events.clone();
                state.auto_sync_watch = Some(tokio::spawn(async move {
                    while rx.recv_async().await.is_ok() {
                        if events.send(PushEvent::AutoSyncChanged).is_err() {
                            break;
                        }
                    }
                }));
            }
        } else if let Some(watch) = state.auto_sync_watch.take() {
            watch.abort();
        }
    }
}

/// Whether the keep-alive service should be running.
///
/// False when no account wants push at all; true while any listener runs, and
/// also while push is suppressed by the system auto-sync switch or a missing
/// network so that listeners resume the moment the condition clears. A
/// user-level "never" policy is not a keep-alive reason.
fn keep_alive_desired(
    any_push_account: bool,
    auto_sync_disabled: bool,
    network_unavailable: bool,
    listeners_running: bool,
) -> bool {
    any_push_account && (auto_sync_disabled || network_unavailable || listeners_running)
}

struct KeyDiff {
    remove: Vec<AccountId>,
    add: Vec<AccountId>,
}

fn diff_keys(current: &HashSet<AccountId>, desired: &HashSet<AccountId>) -> KeyDiff {
    KeyDiff {
        remove: current.difference(desired).copied().collect(),
        add: desired.difference(current).copied().collect(),
    }
}
