use crate::advisory::Advisory;

/// Chat transcript entry exchanged between the prompt form and the panels
/// that mirror it. Either half may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChatMessage {
    pub prompt: Option<String>,
    pub response: Option<String>,
}

impl ChatMessage {
    pub fn prompt(text: impl Into<String>) -> Self {
        Self {
            prompt: Some(text.into()),
            response: None,
        }
    }

    pub fn response(text: impl Into<String>) -> Self {
        Self {
            prompt: None,
            response: Some(text.into()),
        }
    }
}

/// Messages carried by the application bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BusMessage {
    Chat(ChatMessage),
    Advisory(Advisory),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u32);

/// A delivered message tagged with its publish sequence number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<M> {
    pub seq: u64,
    pub message: M,
}

#[derive(Debug)]
struct Subscriber<M> {
    id: SubscriberId,
    queue: Vec<Envelope<M>>,
}

/// Explicit publish/subscribe channel.
///
/// The bus is owned by the application and handed to components by
/// reference. Every subscriber gets its own queue; publishing clones the
/// message once per subscriber. Delivery order equals publish order.
#[derive(Debug)]
pub struct EventBus<M = BusMessage> {
    subscribers: Vec<Subscriber<M>>,
    next_subscriber: u32,
    next_seq: u64,
}

impl<M> Default for EventBus<M> {
    fn default() -> Self {
        Self {
            subscribers: Vec::new(),
            next_subscriber: 0,
            next_seq: 0,
        }
    }
}

impl<M: Clone> EventBus<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self) -> SubscriberId {
        let id = SubscriberId(self.next_subscriber);
        self.next_subscriber += 1;
        self.subscribers.push(Subscriber {
            id,
            queue: Vec::new(),
        });
        id
    }

    /// Returns `true` if `id` was subscribed. Undelivered messages are dropped.
    pub fn unsubscribe(&mut self, id: SubscriberId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Queues `message` for every current subscriber and returns how many
    /// received it. Messages published with no subscribers are discarded.
    pub fn publish(&mut self, message: M) -> usize {
        let seq = self.next_seq;
        self.next_seq += 1;
        for sub in &mut self.subscribers {
            sub.queue.push(Envelope {
                seq,
                message: message.clone(),
            });
        }
        self.subscribers.len()
    }

    pub fn pending(&self, id: SubscriberId) -> usize {
        self.subscribers
            .iter()
            .find(|s| s.id == id)
            .map_or(0, |s| s.queue.len())
    }

    pub fn drain(&mut self, id: SubscriberId) -> Vec<Envelope<M>> {
        self.subscribers
            .iter_mut()
            .find(|s| s.id == id)
            .map(|s| std::mem::take(&mut s.queue))
            .unwrap_or_default()
    }

    pub fn published(&self) -> u64 {
        self.next_seq
    }
}

impl EventBus<BusMessage> {
    pub fn advise(&mut self, advisory: Advisory) -> usize {
        self.publish(BusMessage::Advisory(advisory))
    }

    pub fn chat(&mut self, message: ChatMessage) -> usize {
        self.publish(BusMessage::Chat(message))
    }
}
