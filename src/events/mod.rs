//! Real-time events pushed to socket clients after successful writes.
//!
//! Publishing is fire-and-forget: there is no delivery, ordering or retry
//! guarantee, and a write never fails because nobody is listening.

use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

use crate::database::{Entity, Record};

const DEFAULT_CAPACITY: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventAction {
    Created,
    Updated,
}

impl EventAction {
    fn as_str(&self) -> &'static str {
        match self {
            EventAction::Created => "created",
            EventAction::Updated => "updated",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Event {
    /// `<resource>.<action>`, e.g. `lead.created`
    pub event: String,
    pub data: serde_json::Value,
    /// Only this user receives the event when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    pub timestamp: i64,
}

impl Event {
    pub fn for_record<T: Entity>(action: EventAction, record: &Record<T>) -> Self {
        let data = serde_json::to_value(record).unwrap_or_else(|e| {
            log::warn!("⚠️ Failed to serialize {} event payload: {}", T::RESOURCE, e);
            serde_json::Value::Null
        });

        Self {
            event: format!("{}.{}", T::RESOURCE, action.as_str()),
            data,
            recipient: None,
            timestamp: chrono::Utc::now().timestamp(),
        }
    }

    pub fn to_user(mut self, recipient: Option<String>) -> Self {
        self.recipient = recipient;
        self
    }

    pub fn is_visible_to(&self, user_id: &str) -> bool {
        self.recipient.as_deref().map_or(true, |r| r == user_id)
    }
}

/// Broadcasts events to every connected socket session.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
    subscriber_count: Arc<AtomicUsize>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender,
            subscriber_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn publish(&self, event: Event) {
        let name = event.event.clone();
        match self.sender.send(event) {
            Ok(count) => log::debug!("📣 Event published: {} (subscribers={})", name, count),
            Err(_) => log::debug!("📣 Event published (no subscribers): {}", name),
        }
    }

    pub fn publish_record<T: Entity>(&self, action: EventAction, record: &Record<T>) {
        self.publish(Event::for_record(action, record));
    }

    pub fn subscribe(&self) -> EventSubscriber {
        let receiver = self.sender.subscribe();
        let count = self.subscriber_count.fetch_add(1, Ordering::SeqCst) + 1;
        log::info!("🔌 New event subscriber, total: {}", count);

        EventSubscriber {
            receiver,
            subscriber_count: self.subscriber_count.clone(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscriber_count.load(Ordering::SeqCst)
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

pub struct EventSubscriber {
    receiver: broadcast::Receiver<Event>,
    subscriber_count: Arc<AtomicUsize>,
}

impl EventSubscriber {
    /// Waits for the next event. Returns `None` once the bus is gone.
    pub async fn recv(&mut self) -> Option<Event> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    log::warn!("⚠️ Subscriber lagged, {} events missed", count);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Returns every event already queued for this subscriber.
    pub fn drain(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(event) => events.push(event),
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return events,
            }
        }
    }
}

impl Drop for EventSubscriber {
    fn drop(&mut self) {
        let prev = self.subscriber_count.fetch_sub(1, Ordering::SeqCst);
        log::info!("🔌 Event subscriber disconnected, remaining: {}", prev.saturating_sub(1));
    }
}
