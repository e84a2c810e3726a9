use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::{Message, MessageType, Source};

/// Type of a webhook event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum EventType {
    Message,
    Follow,
    Unfollow,
    Join,
    Leave,
    Postback,
    Beacon,
    AccountLink,
    MemberJoined,
    MemberLeft,
    Things,
    Unsend,
    VideoPlayComplete,
    #[serde(other)]
    Unknown,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Message => "message",
            EventType::Follow => "follow",
            EventType::Unfollow => "unfollow",
            EventType::Join => "join",
            EventType::Leave => "leave",
            EventType::Postback => "postback",
            EventType::Beacon => "beacon",
            EventType::AccountLink => "accountLink",
            EventType::MemberJoined => "memberJoined",
            EventType::MemberLeft => "memberLeft",
            EventType::Things => "things",
            EventType::Unsend => "unsend",
            EventType::VideoPlayComplete => "videoPlayComplete",
            EventType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliveryContext {
    pub is_redelivery: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Postback {
    pub data: String,
    pub params: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Beacon {
    pub hwid: String,
    #[serde(rename = "type")]
    pub beacon_type: String,
    pub dm: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AccountLink {
    pub result: String,
    pub nonce: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Members {
    pub members: Vec<Source>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Unsend {
    pub message_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoPlayComplete {
    pub tracking_id: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Things {
    pub device_id: String,
    #[serde(rename = "type")]
    pub things_type: String,
    pub result: Option<serde_json::Value>,
}

/// A single event from a webhook delivery.
///
/// The envelope fields are shared by every event type; the payload field
/// matching `event_type` is populated (`message` for message events,
/// `postback` for postback events and so on).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub timestamp: i64,
    pub source: Option<Source>,
    pub mode: Option<String>,
    pub webhook_event_id: Option<String>,
    pub delivery_context: Option<DeliveryContext>,
    pub reply_token: Option<String>,

    pub message: Option<Message>,
    pub postback: Option<Postback>,
    pub beacon: Option<Beacon>,
    pub link: Option<AccountLink>,
    pub joined: Option<Members>,
    pub left: Option<Members>,
    pub unsend: Option<Unsend>,
    pub video_play_complete: Option<VideoPlayComplete>,
    pub things: Option<Things>,

    /// The event exactly as delivered
    #[serde(skip)]
    pub raw: Option<serde_json::Value>,
}

impl Event {
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            timestamp: 0,
            source: None,
            mode: None,
            webhook_event_id: None,
            delivery_context: None,
            reply_token: None,
            message: None,
            postback: None,
            beacon: None,
            link: None,
            joined: None,
            left: None,
            unsend: None,
            video_play_complete: None,
            things: None,
            raw: None,
        }
    }

    /// Build a message event around `message`
    pub fn from_message(message: Message) -> Self {
        let mut event = Self::new(EventType::Message);
        event.message = Some(message);
        event
    }

    pub fn with_source(mut self, source: Source) -> Self {
        self.source = Some(source);
        self
    }

    pub fn with_reply_token(mut self, token: impl Into<String>) -> Self {
        self.reply_token = Some(token.into());
        self
    }

    pub fn with_timestamp(mut self, millis: i64) -> Self {
        self.timestamp = millis;
        self
    }

    pub fn with_raw(mut self, raw: serde_json::Value) -> Self {
        self.raw = Some(raw);
        self
    }

    /// Sub-type of the nested message, for message events only
    pub fn message_type(&self) -> Option<MessageType> {
        if self.event_type != EventType::Message {
            return None;
        }
        self.message.as_ref().map(|m| m.message_type)
    }

    pub fn time(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.timestamp).single()
    }

    pub fn is_redelivery(&self) -> bool {
        self.delivery_context
            .as_ref()
            .map(|ctx| ctx.is_redelivery)
            .unwrap_or(false)
    }
}
