use {
    crate::tasks::{TaskEntry, TaskState},
    snapsend_channels::{AdapterRegistry, stub_registry},
    snapsend_config::SnapsendConfig,
    snapsend_routing::Dispatcher,
    snapsend_sessions::LinkSessionStore,
    std::{
        collections::{BTreeSet, HashMap},
        sync::Arc,
        time::Duration,
    },
    tokio::sync::RwLock,
};

/// Shared gateway runtime state, wrapped in Arc for use across async tasks.
pub struct GatewayState {
    pub config: SnapsendConfig,
    /// Registered channel adapters (also reachable through the dispatcher;
    /// kept here for direct notice sends).
    pub adapters: Arc<AdapterRegistry>,
    /// Ordered-fallback dispatcher over the registered adapters.
    pub dispatcher: Dispatcher,
    /// Link sessions for the chat handshake, keyed by token. Writes are
    /// per-token and applied under the write guard, so a poller never sees
    /// a half-applied transition.
    pub sessions: Arc<RwLock<LinkSessionStore>>,
    /// Background dispatch tasks, keyed by task id. Finished entries are
    /// pruned after a retention window so the map stays bounded.
    pub(crate) tasks: RwLock<HashMap<String, TaskEntry>>,
    /// Subscriber email addresses for broadcast notices.
    pub subscribers: RwLock<BTreeSet<String>>,
    /// Server version string.
    pub version: String,
}

impl GatewayState {
    /// Production state: stub adapters with their default latency, failure
    /// simulation per config.
    pub fn new(config: SnapsendConfig) -> Arc<Self> {
        let adapters = Arc::new(stub_registry(config.delivery.simulate_failures, None));
        Self::with_adapters(config, adapters)
    }

    /// State over an explicit adapter set (tests inject doubles here).
    pub fn with_adapters(config: SnapsendConfig, adapters: Arc<AdapterRegistry>) -> Arc<Self> {
        let ttl = Duration::from_secs(config.delivery.session_ttl_minutes * 60);
        let sessions = Arc::new(RwLock::new(LinkSessionStore::new(ttl)));
        let dispatcher = Dispatcher::new(
            Arc::clone(&adapters),
            Arc::clone(&sessions),
            config.chat.bot_name.clone(),
        );

        Arc::new(Self {
            config,
            adapters,
            dispatcher,
            sessions,
            tasks: RwLock::new(HashMap::new()),
            subscribers: RwLock::new(BTreeSet::new()),
            version: env!("CARGO_PKG_VERSION").to_string(),
        })
    }

    /// Look up a task by id.
    pub async fn task(&self, task_id: &str) -> Option<TaskState> {
        self.tasks.read().await.get(task_id).map(|e| e.state.clone())
    }

    /// Drop finished tasks older than `retention`. Running tasks are kept
    /// regardless of age.
    pub async fn prune_finished_tasks(&self, retention: Duration) {
        let now = std::time::Instant::now();
        self.tasks
            .write()
            .await
            .retain(|_, e| e.done_at.is_none_or(|done| now.duration_since(done) < retention));
    }
}
