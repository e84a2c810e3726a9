//! Handler keys - What a handler is registered under

use std::fmt;

use crate::domain::entities::{Event, EventType, MessageType};

/// Registry key: an event type, optionally narrowed to one message type.
///
/// Only `EventType::Message` keys carry a message type in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerKey {
    pub event: EventType,
    pub message: Option<MessageType>,
}

impl HandlerKey {
    pub fn event(event: EventType) -> Self {
        Self { event, message: None }
    }

    pub fn message(message: MessageType) -> Self {
        Self {
            event: EventType::Message,
            message: Some(message),
        }
    }

    /// Most specific key for `event`: event + message type for message events
    pub fn specific(event: &Event) -> Option<Self> {
        event.message_type().map(|mt| Self {
            event: event.event_type,
            message: Some(mt),
        })
    }

    /// Event-only key for `event`
    pub fn general(event: &Event) -> Self {
        Self::event(event.event_type)
    }
}

impl fmt::Display for HandlerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message {
            Some(mt) => write!(f, "{}:{}", self.event, mt),
            None => write!(f, "{}", self.event),
        }
    }
}
