//! MessageBus implementation - intake queue, processing loop, correlation.
//!
//! Messages are processed strictly in enqueue order by a single processing
//! loop; concurrency across workflow steps comes from the orchestrator
//! issuing multiple `send_and_await` calls at once, each suspending
//! independently while the loop serializes handler invocation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::bus::registry::{Worker, WorkerRegistry};
use crate::domain::{Message, MessagePriority, MessageResponse};
use crate::error::{ReelrError, Result};

/// Sender name used for bus-generated failure responses
const SYSTEM_SENDER: &str = "system";

/// Configuration for the MessageBus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageBusConfig {
    /// Intake queue capacity; senders wait when it fills up
    pub queue_capacity: usize,
    /// Default bound for `send_and_await` callers that don't pass their own
    pub default_timeout_ms: u64,
}

impl Default for MessageBusConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 256,
            default_timeout_ms: 300000,
        }
    }
}

/// Point-to-point asynchronous message delivery between named endpoints.
pub struct MessageBus {
    registry: Arc<WorkerRegistry>,
    tx: mpsc::Sender<Message>,
    /// Taken by `start()`; present only before the processing loop runs
    intake: Mutex<Option<mpsc::Receiver<Message>>>,
    /// Correlation table: message id -> the waiting caller's response slot
    pending: Arc<Mutex<HashMap<String, oneshot::Sender<MessageResponse>>>>,
    config: MessageBusConfig,
}

impl MessageBus {
    /// Create a bus with default configuration
    pub fn new() -> Self {
        Self::with_config(MessageBusConfig::default())
    }

    /// Create a bus with custom configuration
    pub fn with_config(config: MessageBusConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity);
        Self {
            registry: Arc::new(WorkerRegistry::new()),
            tx,
            intake: Mutex::new(Some(rx)),
            pending: Arc::new(Mutex::new(HashMap::new())),
            config,
        }
    }

    /// Bind a logical name to a handler, replacing any prior binding
    pub fn register(&self, name: impl Into<String>, worker: Arc<dyn Worker>) {
        self.registry.register(name, worker);
    }

    /// All registered worker names, sorted
    pub fn registered_workers(&self) -> Vec<String> {
        self.registry.names()
    }

    /// The default await bound from configuration
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.config.default_timeout_ms)
    }

    /// Start the processing loop.
    ///
    /// Returns the loop's task handle; the loop runs until the bus is dropped
    /// or the handle is aborted. Calling `start` twice is an error.
    pub fn start(&self) -> Result<JoinHandle<()>> {
        let intake = self
            .intake
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| ReelrError::InvalidTransition("message bus already started".to_string()))?;

        let registry = self.registry.clone();
        let pending = self.pending.clone();

        Ok(tokio::spawn(Self::process_loop(intake, registry, pending)))
    }

    /// Fire-and-forget delivery: enqueue for asynchronous processing.
    ///
    /// Fails synchronously with `UnknownWorker` when the receiver has no
    /// registered handler.
    pub async fn send(
        &self,
        sender: &str,
        receiver: &str,
        message_type: &str,
        content: Value,
        priority: MessagePriority,
    ) -> Result<()> {
        if !self.registry.contains(receiver) {
            return Err(ReelrError::UnknownWorker(receiver.to_string()));
        }

        let message = Message::new(sender, receiver, message_type, content).with_priority(priority);
        tracing::debug!(
            sender = %sender,
            receiver = %receiver,
            message_type = %message_type,
            "Sending message"
        );

        self.enqueue(message).await
    }

    /// Enqueue a message and suspend until the handler's response arrives or
    /// `timeout` elapses.
    ///
    /// On timeout the returned response has `success = false` and a timeout
    /// error; the in-flight handler is NOT cancelled - if it later completes,
    /// its result is discarded because the correlation entry is gone.
    pub async fn send_and_await(
        &self,
        sender: &str,
        receiver: &str,
        message_type: &str,
        content: Value,
        timeout: Duration,
    ) -> Result<MessageResponse> {
        if !self.registry.contains(receiver) {
            return Err(ReelrError::UnknownWorker(receiver.to_string()));
        }

        let message = Message::new(sender, receiver, message_type, content);
        let message_id = message.message_id.clone();

        let (response_tx, response_rx) = oneshot::channel();
        self.pending.lock().unwrap().insert(message_id.clone(), response_tx);

        if let Err(e) = self.enqueue(message).await {
            self.pending.lock().unwrap().remove(&message_id);
            return Err(e);
        }

        match tokio::time::timeout(timeout, response_rx).await {
            Ok(Ok(response)) => Ok(response),
            // The pending map was dropped along with the bus
            Ok(Err(_)) => Err(ReelrError::BusClosed),
            Err(_) => {
                self.pending.lock().unwrap().remove(&message_id);
                tracing::warn!(
                    message_id = %message_id,
                    receiver = %receiver,
                    timeout_ms = timeout.as_millis() as u64,
                    "Timed out waiting for response"
                );
                Ok(MessageResponse::failure(
                    message_id,
                    SYSTEM_SENDER,
                    ReelrError::Timeout(timeout.as_millis() as u64).to_string(),
                ))
            }
        }
    }

    /// Send the same message independently to every target, or to every
    /// registered worker except the sender when targets are unspecified.
    ///
    /// Each delivery is fire-and-forget and failures are independent; returns
    /// the number of deliveries enqueued.
    pub async fn broadcast(
        &self,
        sender: &str,
        message_type: &str,
        content: Value,
        targets: Option<&[String]>,
    ) -> Result<usize> {
        let receivers: Vec<String> = match targets {
            Some(list) => list.to_vec(),
            None => self.registry.names(),
        };

        let mut delivered = 0;
        for receiver in receivers.iter().filter(|r| r.as_str() != sender) {
            match self
                .send(sender, receiver, message_type, content.clone(), MessagePriority::Normal)
                .await
            {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(receiver = %receiver, error = %e, "Broadcast delivery skipped");
                }
            }
        }

        tracing::info!(
            sender = %sender,
            message_type = %message_type,
            delivered = delivered,
            "Broadcast complete"
        );
        Ok(delivered)
    }

    async fn enqueue(&self, message: Message) -> Result<()> {
        self.tx.send(message).await.map_err(|_| ReelrError::BusClosed)
    }

    /// Pull one message at a time, in enqueue order, until the intake closes.
    async fn process_loop(
        mut intake: mpsc::Receiver<Message>,
        registry: Arc<WorkerRegistry>,
        pending: Arc<Mutex<HashMap<String, oneshot::Sender<MessageResponse>>>>,
    ) {
        tracing::info!("Message processor started");
        while let Some(message) = intake.recv().await {
            Self::dispatch(message, &registry, &pending).await;
        }
        tracing::info!("Message processor stopped");
    }

    /// Invoke the receiver's handler and resolve the sender's correlation if
    /// one exists. Handler failures become failure responses, never faults of
    /// the bus itself.
    async fn dispatch(
        message: Message,
        registry: &Arc<WorkerRegistry>,
        pending: &Arc<Mutex<HashMap<String, oneshot::Sender<MessageResponse>>>>,
    ) {
        let response = match registry.get(&message.receiver) {
            None => {
                tracing::warn!(receiver = %message.receiver, "Message for unknown worker");
                MessageResponse::failure(
                    message.message_id.clone(),
                    SYSTEM_SENDER,
                    ReelrError::UnknownWorker(message.receiver.clone()).to_string(),
                )
            }
            Some(worker) => match worker.handle(&message).await {
                Ok(content) => MessageResponse::success(
                    message.message_id.clone(),
                    message.receiver.clone(),
                    content,
                ),
                Err(e) => {
                    tracing::error!(
                        message_id = %message.message_id,
                        receiver = %message.receiver,
                        error = %e,
                        "Handler failed"
                    );
                    MessageResponse::failure(
                        message.message_id.clone(),
                        message.receiver.clone(),
                        e.to_string(),
                    )
                }
            },
        };

        let waiter = pending.lock().unwrap().remove(&message.message_id);
        if let Some(tx) = waiter {
            if tx.send(response).is_err() {
                // Caller abandoned the wait (timeout); the result is discarded
                tracing::debug!(message_id = %message.message_id, "Discarding response, no waiter");
            }
        }
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}
