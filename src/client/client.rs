//! Concurrent A2A client
//!
//! Owns one [`AgentConnection`] per configured URL plus all shared mutable
//! state: the card cache, the capability cache and the availability map.
//! Every mutation path goes through this type so the lock discipline stays in
//! one place.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::sync::{mpsc, oneshot, watch, Mutex, RwLock};
use tokio::time::{interval, sleep};
use tracing::{debug, error, info, warn};

use crate::config::A2aConfig;
use crate::error::{A2aError, A2aResult, Result};
use crate::protocol::card::{AgentCapabilities, AgentCard};
use crate::protocol::events::TaskEvent;
use crate::protocol::message::{MessageSendParams, SendMessageResult};
use crate::protocol::task::{Task, TaskIdParams, TaskQueryParams};

use super::connection::AgentConnection;

/// Capacity of the streaming relay channels
const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Availability of a configured agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AgentState {
    /// Not probed yet
    #[default]
    Unknown,

    /// Last probe succeeded
    Available,

    /// Last probe failed
    Unavailable,
}

/// Shared state behind the client; cloned into background tasks
struct ClientShared {
    config: A2aConfig,
    connections: HashMap<String, AgentConnection>,
    cards: RwLock<HashMap<String, AgentCard>>,
    capabilities: RwLock<HashMap<String, AgentCapabilities>>,
    statuses: RwLock<HashMap<String, AgentState>>,
}

impl ClientShared {
    fn connection(&self, url: &str) -> A2aResult<&AgentConnection> {
        self.connections
            .get(url)
            .ok_or_else(|| A2aError::AgentNotFound {
                url: url.to_string(),
            })
    }

    /// Fetch and cache the agent's card with bounded exponential backoff
    ///
    /// Used both at startup and by the reconnection paths. On success the
    /// status flips to `Available`, on exhaustion to `Unavailable`.
    async fn initialize_agent(&self, url: &str) -> A2aResult<()> {
        let conn = self.connection(url)?;
        let attempts = self.config.max_retries + 1;
        let mut backoff = self.config.initial_backoff;
        let mut last_err = None;

        for attempt in 1..=attempts {
            match conn.fetch_agent_card().await {
                Ok(card) => {
                    info!(url, agent = %card.name, version = %card.version, "Agent initialized");
                    self.capabilities
                        .write()
                        .await
                        .insert(url.to_string(), card.capabilities);
                    self.cards.write().await.insert(url.to_string(), card);
                    self.statuses
                        .write()
                        .await
                        .insert(url.to_string(), AgentState::Available);
                    return Ok(());
                }
                Err(e) => {
                    debug!(url, attempt, error = %e, "Agent card fetch failed");
                    last_err = Some(e);
                    if attempt < attempts {
                        sleep(backoff).await;
                        backoff = (backoff * 2).min(self.config.retry_interval);
                    }
                }
            }
        }

        self.statuses
            .write()
            .await
            .insert(url.to_string(), AgentState::Unavailable);
        Err(last_err.unwrap_or_else(|| A2aError::Connection {
            url: url.to_string(),
            message: "initialization failed".to_string(),
        }))
    }

    /// One health check for one agent
    ///
    /// The health endpoint is the cheap probe; a card re-fetch is the
    /// fallback liveness signal. Logs only on an actual transition.
    async fn check_agent_health(self: &Arc<Self>, url: &str) {
        let conn = match self.connection(url) {
            Ok(conn) => conn,
            Err(_) => return,
        };

        let healthy = conn.check_health().await || conn.fetch_agent_card().await.is_ok();
        let new_status = if healthy {
            AgentState::Available
        } else {
            AgentState::Unavailable
        };

        let previous = {
            let mut statuses = self.statuses.write().await;
            let previous = statuses.get(url).copied().unwrap_or_default();
            statuses.insert(url.to_string(), new_status);
            previous
        };

        if previous != new_status {
            info!(url, ?previous, status = ?new_status, "Agent status changed");
        }

        if previous == AgentState::Available
            && new_status == AgentState::Unavailable
            && self.config.reconnect.enabled
        {
            let shared = Arc::clone(self);
            let url = url.to_string();
            tokio::spawn(async move {
                if let Err(e) = shared.initialize_agent(&url).await {
                    debug!(url = %url, error = %e, "One-shot reconnection failed");
                }
            });
        }
    }

    /// Ticker-driven retry of currently-failed agents; self-terminates once
    /// every URL in the working set has recovered.
    fn spawn_reconnect_loop(self: &Arc<Self>, mut pending: Vec<String>) {
        let shared = Arc::clone(self);
        tokio::spawn(async move {
            info!(agents = pending.len(), "Starting background reconnection loop");
            let mut ticker = interval(shared.config.reconnect.interval);
            ticker.tick().await; // the first tick completes immediately

            loop {
                ticker.tick().await;

                {
                    let statuses = shared.statuses.read().await;
                    pending
                        .retain(|url| !matches!(statuses.get(url), Some(AgentState::Available)));
                }
                if pending.is_empty() {
                    info!("All agents reconnected, stopping reconnection loop");
                    return;
                }

                for url in &pending {
                    let shared = Arc::clone(&shared);
                    let url = url.clone();
                    tokio::spawn(async move {
                        if let Err(e) = shared.initialize_agent(&url).await {
                            debug!(url = %url, error = %e, "Reconnection attempt failed");
                        }
                    });
                }
            }
        });
    }
}

/// Handle to the background status-polling task
struct PollingHandle {
    shutdown: watch::Sender<bool>,
    done: oneshot::Receiver<()>,
}

/// A2A protocol client
pub struct A2aClient {
    shared: Arc<ClientShared>,
    initialized: AtomicBool,
    polling: Mutex<Option<PollingHandle>>,
}

impl A2aClient {
    /// Create a client for the agents named in `config`
    pub fn new(config: A2aConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.client_timeout)
            .build()?;

        let connections: HashMap<String, AgentConnection> = config
            .agent_urls
            .iter()
            .map(|url| (url.clone(), AgentConnection::new(url.clone(), http.clone())))
            .collect();

        let statuses = config
            .agent_urls
            .iter()
            .map(|url| (url.clone(), AgentState::Unknown))
            .collect();

        Ok(Self {
            shared: Arc::new(ClientShared {
                config,
                connections,
                cards: RwLock::new(HashMap::new()),
                capabilities: RwLock::new(HashMap::new()),
                statuses: RwLock::new(statuses),
            }),
            initialized: AtomicBool::new(false),
            polling: Mutex::new(None),
        })
    }

    /// Create a client from environment configuration
    pub fn from_env() -> Result<Self> {
        Self::new(A2aConfig::from_env()?)
    }

    /// The client's configuration
    pub fn config(&self) -> &A2aConfig {
        &self.shared.config
    }

    /// Configured agent URLs
    pub fn list_agents(&self) -> Vec<String> {
        self.shared.config.agent_urls.clone()
    }

    /// Initialize every configured agent
    ///
    /// Per-agent failures do not abort the set; failed agents enter the
    /// background reconnection loop when reconnect is enabled. An error is
    /// returned only when zero agents came up.
    pub async fn initialize_all(&self) -> A2aResult<()> {
        if self.shared.connections.is_empty() {
            return Err(A2aError::NoAgentUrls);
        }

        let total = self.shared.config.agent_urls.len();
        let mut failed = Vec::new();
        for url in &self.shared.config.agent_urls {
            if let Err(e) = self.shared.initialize_agent(url).await {
                warn!(url = %url, error = %e, "Agent failed to initialize");
                failed.push(url.clone());
            }
        }

        // The gate opens even on total failure so that agents recovered by
        // the reconnection loop become usable without another call here.
        self.initialized.store(true, Ordering::SeqCst);

        if self.shared.config.reconnect.enabled && !failed.is_empty() {
            self.shared.spawn_reconnect_loop(failed.clone());
        }

        if failed.len() == total {
            return Err(A2aError::NoAgentsInitialized);
        }

        info!(
            initialized = total - failed.len(),
            failed = failed.len(),
            "A2A client initialized"
        );
        Ok(())
    }

    /// Get an agent's card, fetching and caching on a miss
    pub async fn get_agent_card(&self, url: &str) -> A2aResult<AgentCard> {
        let conn = self.shared.connection(url)?;
        if let Some(card) = self.shared.cards.read().await.get(url) {
            return Ok(card.clone());
        }

        let card = conn.fetch_agent_card().await?;
        self.shared
            .capabilities
            .write()
            .await
            .insert(url.to_string(), card.capabilities);
        self.shared
            .cards
            .write()
            .await
            .insert(url.to_string(), card.clone());
        Ok(card)
    }

    /// Fetch an agent's card, overwriting the cache
    pub async fn refresh_agent_card(&self, url: &str) -> A2aResult<AgentCard> {
        let conn = self.shared.connection(url)?;
        let card = conn.fetch_agent_card().await?;
        self.shared
            .capabilities
            .write()
            .await
            .insert(url.to_string(), card.capabilities);
        self.shared
            .cards
            .write()
            .await
            .insert(url.to_string(), card.clone());
        Ok(card)
    }

    /// Cached capability flags for an agent, if initialized
    pub async fn agent_capabilities(&self, url: &str) -> Option<AgentCapabilities> {
        self.shared.capabilities.read().await.get(url).copied()
    }

    /// Blocking `message/send`
    pub async fn send_message(
        &self,
        params: MessageSendParams,
        url: &str,
    ) -> A2aResult<SendMessageResult> {
        self.ensure_initialized()?;
        let conn = self.shared.connection(url)?;
        debug!(url, method = "message/send", "Sending A2A message");
        conn.send_message(params).await
    }

    /// Streaming `message/stream`
    ///
    /// Returns a bounded byte channel of serialized [`TaskEvent`]s. Two
    /// relay tasks feed it: one drains the wire stream into an intermediate
    /// event channel, one re-serializes events onto the output. Dropping the
    /// receiver tears both down. A failure to open the stream is returned
    /// synchronously.
    pub async fn send_streaming_message(
        &self,
        params: MessageSendParams,
        url: &str,
    ) -> A2aResult<mpsc::Receiver<Bytes>> {
        self.ensure_initialized()?;
        let conn = self.shared.connection(url)?.clone();
        debug!(url, method = "message/stream", "Opening A2A message stream");

        let mut stream = conn.send_message_streaming(params).await?;

        let (event_tx, mut event_rx) = mpsc::channel::<TaskEvent>(EVENT_CHANNEL_CAPACITY);
        let (out_tx, out_rx) = mpsc::channel::<Bytes>(EVENT_CHANNEL_CAPACITY);

        let stream_url = url.to_string();
        tokio::spawn(async move {
            while let Some(item) = stream.next().await {
                match item {
                    Ok(event) => {
                        if event_tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        error!(url = %stream_url, error = %e, "A2A event stream failed");
                        break;
                    }
                }
            }
        });

        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                let payload = match serde_json::to_vec(&event) {
                    Ok(payload) => payload,
                    Err(e) => {
                        error!(error = %e, "Failed to serialize stream event");
                        break;
                    }
                };
                if out_tx.send(Bytes::from(payload)).await.is_err() {
                    break;
                }
            }
        });

        Ok(out_rx)
    }

    /// `tasks/get`
    pub async fn get_task(&self, params: TaskQueryParams, url: &str) -> A2aResult<Task> {
        self.ensure_initialized()?;
        let conn = self.shared.connection(url)?;
        conn.get_task(params).await
    }

    /// `tasks/cancel`
    pub async fn cancel_task(&self, params: TaskIdParams, url: &str) -> A2aResult<Task> {
        self.ensure_initialized()?;
        let conn = self.shared.connection(url)?;
        conn.cancel_task(params).await
    }

    /// Availability of one agent; unconfigured URLs read `Unknown`
    pub async fn agent_status(&self, url: &str) -> AgentState {
        self.shared
            .statuses
            .read()
            .await
            .get(url)
            .copied()
            .unwrap_or_default()
    }

    /// Snapshot of all agent availabilities
    pub async fn all_agent_statuses(&self) -> HashMap<String, AgentState> {
        self.shared.statuses.read().await.clone()
    }

    /// Start the background health-polling loop
    ///
    /// Each tick launches one concurrent check per agent without awaiting
    /// them. A no-op when polling is disabled or already running.
    pub async fn start_status_polling(&self) {
        if !self.shared.config.polling.enabled {
            debug!("Status polling disabled by configuration");
            return;
        }

        let mut guard = self.polling.lock().await;
        if guard.is_some() {
            return;
        }

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let (done_tx, done_rx) = oneshot::channel();
        let shared = Arc::clone(&self.shared);

        tokio::spawn(async move {
            info!(
                interval = ?shared.config.polling.status_interval,
                "Starting agent status polling"
            );
            let mut ticker = interval(shared.config.polling.status_interval);
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = shutdown_rx.changed() => break,
                    _ = ticker.tick() => {
                        for url in shared.connections.keys() {
                            let shared = Arc::clone(&shared);
                            let url = url.clone();
                            tokio::spawn(async move {
                                shared.check_agent_health(&url).await;
                            });
                        }
                    }
                }
            }

            debug!("Agent status polling stopped");
            let _ = done_tx.send(());
        });

        *guard = Some(PollingHandle {
            shutdown: shutdown_tx,
            done: done_rx,
        });
    }

    /// Stop the polling loop and wait for it to wind down
    ///
    /// Guarantees no new check starts after this returns. A no-op if polling
    /// was never started.
    pub async fn stop_status_polling(&self) {
        let handle = self.polling.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.shutdown.send(true);
            let _ = handle.done.await;
        }
    }

    fn ensure_initialized(&self) -> A2aResult<()> {
        if self.initialized.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(A2aError::NotInitialized)
        }
    }
}
