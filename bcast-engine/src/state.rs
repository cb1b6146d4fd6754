//! Engine state: the single owned state object shared by all handlers, the
//! broadcast flags, and the scope guard for the one-shot lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bcast_core::{Gateway, Group, StoredMessage};
use bcast_store::JsonStore;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::{error, info};

use crate::composer::ComposeSession;

/// The three persisted collections plus ephemeral per-user sessions and the
/// auto-broadcast rotation cursor. Mutated only while holding the engine
/// lock; every mutation persists the affected collection before the handler
/// returns.
pub struct EngineState {
    pub messages: Vec<StoredMessage>,
    pub groups: Vec<Group>,
    pub admins: Vec<String>,
    pub sessions: HashMap<i64, ComposeSession>,
    /// Index into `messages` for the auto-broadcast rotation; clamped to 0
    /// whenever it would index out of range.
    pub rotation_index: usize,
}

impl EngineState {
    /// Next message id: `max(existing) + 1`. Ids are never reused after
    /// deletion.
    pub fn next_message_id(&self) -> u64 {
        self.messages.iter().map(|m| m.id).max().unwrap_or(0) + 1
    }
}

/// The broadcast engine. Shared as `Arc<Engine>` by every handler and the
/// scheduler task. The one-shot and auto flags are independent: a one-shot
/// broadcast and an auto tick may run concurrently against the same groups.
pub struct Engine {
    pub(crate) state: Mutex<EngineState>,
    pub(crate) store: JsonStore,
    pub(crate) gateway: Arc<dyn Gateway>,
    pub(crate) one_shot_in_progress: Arc<AtomicBool>,
    pub(crate) auto_active: Arc<AtomicBool>,
    pub(crate) auto_task: Mutex<Option<JoinHandle<()>>>,
    /// Delay after every group send, success or failure.
    pub(crate) pacing: Duration,
    pub(crate) auto_interval: Duration,
}

impl Engine {
    /// Loads the persisted collections and builds the engine.
    pub fn new(
        store: JsonStore,
        gateway: Arc<dyn Gateway>,
        pacing: Duration,
        auto_interval: Duration,
    ) -> Arc<Self> {
        let state = EngineState {
            messages: store.load_messages(),
            groups: store.load_groups(),
            admins: store.load_admins(),
            sessions: HashMap::new(),
            rotation_index: 0,
        };
        info!(
            messages = state.messages.len(),
            groups = state.groups.len(),
            admins = state.admins.len(),
            "Engine state loaded"
        );
        Arc::new(Self {
            state: Mutex::new(state),
            store,
            gateway,
            one_shot_in_progress: Arc::new(AtomicBool::new(false)),
            auto_active: Arc::new(AtomicBool::new(false)),
            auto_task: Mutex::new(None),
            pacing,
            auto_interval,
        })
    }

    pub fn broadcast_in_progress(&self) -> bool {
        self.one_shot_in_progress.load(Ordering::SeqCst)
    }

    pub fn auto_active(&self) -> bool {
        self.auto_active.load(Ordering::SeqCst)
    }

    pub async fn messages(&self) -> Vec<StoredMessage> {
        self.state.lock().await.messages.clone()
    }

    pub async fn groups(&self) -> Vec<Group> {
        self.state.lock().await.groups.clone()
    }

    pub async fn admins(&self) -> Vec<String> {
        self.state.lock().await.admins.clone()
    }

    pub async fn rotation_index(&self) -> usize {
        self.state.lock().await.rotation_index
    }

    // Save failures are logged and the operation continues without a
    // durability guarantee; the process never aborts over them.

    pub(crate) fn persist_messages(&self, messages: &[StoredMessage]) {
        if let Err(e) = self.store.save_messages(messages) {
            error!(error = %e, "Failed to persist messages; continuing with in-memory state");
        }
    }

    pub(crate) fn persist_groups(&self, groups: &[Group]) {
        if let Err(e) = self.store.save_groups(groups) {
            error!(error = %e, "Failed to persist groups; continuing with in-memory state");
        }
    }

    pub(crate) fn persist_admins(&self, admins: &[String]) {
        if let Err(e) = self.store.save_admins(admins) {
            error!(error = %e, "Failed to persist admins; continuing with in-memory state");
        }
    }
}

/// Scoped acquisition of the one-shot broadcast flag: set on acquire,
/// cleared on Drop, so every exit path of the dispatcher releases it.
pub(crate) struct BroadcastGuard {
    flag: Arc<AtomicBool>,
}

impl BroadcastGuard {
    /// Returns `None` when another one-shot broadcast already holds the flag.
    pub(crate) fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
            .then(|| Self { flag: flag.clone() })
    }
}

impl Drop for BroadcastGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
