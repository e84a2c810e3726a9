//! Domain entities - Webhook events as delivered by the platform

pub mod event;
pub mod message;
pub mod source;

pub use event::{
    AccountLink, Beacon, DeliveryContext, Event, EventType, Members, Postback, Things, Unsend,
    VideoPlayComplete,
};
pub use message::{ContentProvider, Message, MessageType};
pub use source::Source;
