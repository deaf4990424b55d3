// ── Engine actor ──
//
// Moves an `Engine` into a background task so concurrent callers can
// share it without a lock. Requests flow over an mpsc channel with
// oneshot replies; newly raised alerts are fanned out on a broadcast
// channel for live consumers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::engine::Engine;
use crate::error::CoreError;
use crate::model::{Alert, Snapshot};

const REQUEST_CHANNEL_SIZE: usize = 64;
const ALERT_CHANNEL_SIZE: usize = 256;

/// A request sent to the engine task, carrying its own reply channel.
enum Request {
    Analyze {
        snapshot: Snapshot,
        now: DateTime<Utc>,
        reply: oneshot::Sender<Vec<Alert>>,
    },
    Acknowledge {
        alert_id: String,
        reply: oneshot::Sender<Result<Alert, CoreError>>,
    },
    ListActive {
        reply: oneshot::Sender<Vec<Alert>>,
    },
    ListHistory {
        reply: oneshot::Sender<Vec<Alert>>,
    },
}

// ── EngineHandle ─────────────────────────────────────────────────

/// Cloneable front end to an engine running on its own task.
///
/// Every clone talks to the same engine. Once the task has stopped
/// (after [`shutdown`](Self::shutdown) or when the runtime drops it)
/// all calls fail with [`CoreError::EngineStopped`].
#[derive(Clone)]
pub struct EngineHandle {
    request_tx: mpsc::Sender<Request>,
    alert_tx: broadcast::Sender<Arc<Alert>>,
    cancel: CancellationToken,
}

impl EngineHandle {
    /// Spawn the engine task on the current tokio runtime.
    pub fn spawn(engine: Engine) -> Self {
        let (request_tx, request_rx) = mpsc::channel(REQUEST_CHANNEL_SIZE);
        let (alert_tx, _) = broadcast::channel(ALERT_CHANNEL_SIZE);
        let cancel = CancellationToken::new();

        tokio::spawn(engine_task(
            engine,
            request_rx,
            alert_tx.clone(),
            cancel.clone(),
        ));

        Self {
            request_tx,
            alert_tx,
            cancel,
        }
    }

    /// Run one analysis cycle stamped with the current time.
    pub async fn analyze(&self, snapshot: Snapshot) -> Result<Vec<Alert>, CoreError> {
        self.analyze_at(snapshot, Utc::now()).await
    }

    pub async fn analyze_at(
        &self,
        snapshot: Snapshot,
        now: DateTime<Utc>,
    ) -> Result<Vec<Alert>, CoreError> {
        self.request(|reply| Request::Analyze {
            snapshot,
            now,
            reply,
        })
        .await
    }

    pub async fn acknowledge(&self, alert_id: impl Into<String>) -> Result<Alert, CoreError> {
        let alert_id = alert_id.into();
        self.request(|reply| Request::Acknowledge { alert_id, reply })
            .await?
    }

    pub async fn list_active(&self) -> Result<Vec<Alert>, CoreError> {
        self.request(|reply| Request::ListActive { reply }).await
    }

    pub async fn list_history(&self) -> Result<Vec<Alert>, CoreError> {
        self.request(|reply| Request::ListHistory { reply }).await
    }

    /// Receive every newly raised alert from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Alert>> {
        self.alert_tx.subscribe()
    }

    /// Stop the engine task. Pending and future requests fail.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn is_running(&self) -> bool {
        !self.cancel.is_cancelled() && !self.request_tx.is_closed()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> Request,
    ) -> Result<T, CoreError> {
        if self.cancel.is_cancelled() {
            return Err(CoreError::EngineStopped);
        }
        let (tx, rx) = oneshot::channel();
        self.request_tx
            .send(build(tx))
            .await
            .map_err(|_| CoreError::EngineStopped)?;
        rx.await.map_err(|_| CoreError::EngineStopped)
    }
}

// ── Background task ──────────────────────────────────────────────

async fn engine_task(
    mut engine: Engine,
    mut rx: mpsc::Receiver<Request>,
    alert_tx: broadcast::Sender<Arc<Alert>>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            request = rx.recv() => {
                let Some(request) = request else { break };
                handle_request(&mut engine, request, &alert_tx);
            }
        }
    }
    debug!(
        active = engine.store().active_count(),
        history = engine.store().history_count(),
        "engine task stopped"
    );
}

fn handle_request(engine: &mut Engine, request: Request, alert_tx: &broadcast::Sender<Arc<Alert>>) {
    match request {
        Request::Analyze {
            snapshot,
            now,
            reply,
        } => {
            let raised = engine.analyze_at(&snapshot.devices, &snapshot.access_points, now);
            for alert in &raised {
                // No subscribers is fine.
                let _ = alert_tx.send(Arc::new(alert.clone()));
            }
            let _ = reply.send(raised);
        }
        Request::Acknowledge { alert_id, reply } => {
            let _ = reply.send(engine.acknowledge(&alert_id));
        }
        Request::ListActive { reply } => {
            let _ = reply.send(engine.list_active());
        }
        Request::ListHistory { reply } => {
            let _ = reply.send(engine.list_history());
        }
    }
}
