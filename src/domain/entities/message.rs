use serde::{Deserialize, Serialize};
use std::fmt;

/// Type of message content carried by a message event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
    Video,
    Audio,
    Location,
    Sticker,
    File,
    #[serde(other)]
    Unknown,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Image => "image",
            MessageType::Video => "video",
            MessageType::Audio => "audio",
            MessageType::Location => "location",
            MessageType::Sticker => "sticker",
            MessageType::File => "file",
            MessageType::Unknown => "unknown",
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the binary content of an image/video/audio message lives
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentProvider {
    #[serde(rename = "type")]
    pub provider_type: String,
    pub original_content_url: Option<String>,
    pub preview_image_url: Option<String>,
}

/// Message object nested in a message event.
///
/// Fields that only exist for some message types are optional; `message_type`
/// tells which ones to expect.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    #[serde(rename = "type")]
    pub message_type: MessageType,
    pub text: Option<String>,
    pub quote_token: Option<String>,
    pub package_id: Option<String>,
    pub sticker_id: Option<String>,
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
    /// Milliseconds, for audio and video.
    pub duration: Option<u64>,
    pub title: Option<String>,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub content_provider: Option<ContentProvider>,
}

impl Message {
    pub fn new(id: impl Into<String>, message_type: MessageType) -> Self {
        Self {
            id: id.into(),
            message_type,
            text: None,
            quote_token: None,
            package_id: None,
            sticker_id: None,
            file_name: None,
            file_size: None,
            duration: None,
            title: None,
            address: None,
            latitude: None,
            longitude: None,
            content_provider: None,
        }
    }

    pub fn text(id: impl Into<String>, text: impl Into<String>) -> Self {
        let mut msg = Self::new(id, MessageType::Text);
        msg.text = Some(text.into());
        msg
    }

    pub fn sticker(id: impl Into<String>, package_id: impl Into<String>, sticker_id: impl Into<String>) -> Self {
        let mut msg = Self::new(id, MessageType::Sticker);
        msg.package_id = Some(package_id.into());
        msg.sticker_id = Some(sticker_id.into());
        msg
    }
}
