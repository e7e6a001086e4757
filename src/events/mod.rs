use tokio::sync::broadcast;

/// System events published by the SLA engine for other subsystems
/// (automation, webhooks, activity feeds) to consume.
#[derive(Debug, Clone)]
pub enum SystemEvent {
    SlaInstanceCreated {
        instance_id: String,
        workspace_id: String,
        target_type: String,
        target_id: String,
        definition_id: String,
        timestamp: String, // ISO 8601
    },
    SlaWarning {
        instance_id: String,
        workspace_id: String,
        target_id: String,
        phase: String, // "response" | "resolution"
        threshold: f64,
        used_percent: f64,
        timestamp: String, // ISO 8601
    },
    SlaBreached {
        instance_id: String,
        workspace_id: String,
        target_id: String,
        phase: String,       // "response" | "resolution"
        deadline_at: String, // ISO 8601
        timestamp: String,   // ISO 8601
    },
}

/// Event bus for publishing and subscribing to system events
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<SystemEvent>,
}

impl EventBus {
    /// Create a new event bus with specified capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all subscribers (non-blocking, fire-and-forget)
    pub fn publish(&self, event: SystemEvent) {
        // Fire-and-forget - if no subscribers or channel full, just log and continue
        if let Err(e) = self.tx.send(event) {
            tracing::debug!("No subscribers for event: {}", e);
        }
    }

    /// Subscribe to events (returns a receiver)
    pub fn subscribe(&self) -> broadcast::Receiver<SystemEvent> {
        self.tx.subscribe()
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1000) // Default capacity of 1000 events
    }
}
