//! Webhook dispatcher - Routes parsed events to registered handlers

use futures::future::{BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use super::handler_key::HandlerKey;
use super::parser::WebhookParser;
use crate::application::errors::{HandlerError, WebhookError};
use crate::domain::entities::{Event, EventType, MessageType};

/// Handler result
pub type HandlerResult = Result<(), HandlerError>;

/// Handler function type
pub type Handler = Arc<dyn Fn(Event) -> BoxFuture<'static, HandlerResult> + Send + Sync>;

/// What to do when a handler returns an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandlerFailurePolicy {
    /// Stop the delivery and return the error; later events are not dispatched
    #[default]
    Abort,
    /// Log the error and move on to the next event
    Continue,
}

/// Outcome of dispatching one delivery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchSummary {
    /// Events routed to a specific or event-only handler
    pub handled: usize,
    /// Events routed to the default handler
    pub defaulted: usize,
    /// Events no handler resolved for
    pub unmatched: usize,
    /// Handler failures skipped under `HandlerFailurePolicy::Continue`
    pub failed: usize,
}

enum Route<'a> {
    Registered(HandlerKey, &'a Handler),
    Default(HandlerKey, &'a Handler),
    Unmatched(HandlerKey),
}

/// Webhook dispatcher - verifies deliveries and runs the matching handler for each event
pub struct WebhookDispatcher {
    parser: WebhookParser,
    handlers: HashMap<HandlerKey, Handler>,
    default: Option<Handler>,
    failure_policy: HandlerFailurePolicy,
}

impl WebhookDispatcher {
    pub fn new(channel_secret: impl Into<String>) -> Self {
        Self::with_parser(WebhookParser::new(channel_secret))
    }

    pub fn with_parser(parser: WebhookParser) -> Self {
        Self {
            parser,
            handlers: HashMap::new(),
            default: None,
            failure_policy: HandlerFailurePolicy::default(),
        }
    }

    pub fn with_failure_policy(mut self, policy: HandlerFailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn parser(&self) -> &WebhookParser {
        &self.parser
    }

    /// Register a handler under `key`, replacing any handler already there
    pub fn add<F, Fut>(&mut self, key: HandlerKey, handler: F)
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let handler: Handler = Arc::new(move |event| handler(event).boxed());
        if self.handlers.insert(key, handler).is_some() {
            tracing::debug!("Replaced handler for {}", key);
        }
    }

    /// Register a handler for every event of `event_type`
    pub fn on_event<F, Fut>(&mut self, event_type: EventType, handler: F)
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.add(HandlerKey::event(event_type), handler);
    }

    /// Register a handler for message events carrying `message_type`
    pub fn on_message<F, Fut>(&mut self, message_type: MessageType, handler: F)
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.add(HandlerKey::message(message_type), handler);
    }

    /// Register the handler for events nothing else matches
    pub fn set_default<F, Fut>(&mut self, handler: F)
    where
        F: Fn(Event) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        self.default = Some(Arc::new(move |event| handler(event).boxed()));
    }

    /// Number of keyed handlers, not counting the default
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Verify, parse and dispatch one webhook delivery.
    ///
    /// Fails with `WebhookError::InvalidSignature` before any handler runs
    /// when `signature` does not match `body`.
    pub async fn handle(&self, body: &str, signature: &str) -> Result<DispatchSummary, WebhookError> {
        let events = self.parser.parse(body, signature)?;
        self.dispatch(events).await
    }

    /// Run the matching handler for each event, one at a time, in order
    pub async fn dispatch(&self, events: Vec<Event>) -> Result<DispatchSummary, WebhookError> {
        let mut summary = DispatchSummary::default();

        for event in events {
            let (key, handler) = match self.route(&event) {
                Route::Registered(key, handler) => {
                    summary.handled += 1;
                    (key, handler)
                }
                Route::Default(key, handler) => {
                    summary.defaulted += 1;
                    (key, handler)
                }
                Route::Unmatched(key) => {
                    tracing::info!("No handler of {} and no default handler", key);
                    summary.unmatched += 1;
                    continue;
                }
            };

            tracing::debug!("Dispatching {} event to handler {}", event.event_type, key);

            if let Err(source) = handler(event).await {
                match self.failure_policy {
                    HandlerFailurePolicy::Abort => {
                        return Err(WebhookError::Handler { key, source });
                    }
                    HandlerFailurePolicy::Continue => {
                        tracing::warn!("Handler for {} failed: {}", key, source);
                        summary.failed += 1;
                    }
                }
            }
        }

        Ok(summary)
    }

    /// Most specific key first, then event-only, then the default handler
    fn route(&self, event: &Event) -> Route<'_> {
        if let Some(key) = HandlerKey::specific(event) {
            if let Some(handler) = self.handlers.get(&key) {
                return Route::Registered(key, handler);
            }
        }

        let key = HandlerKey::general(event);
        if let Some(handler) = self.handlers.get(&key) {
            return Route::Registered(key, handler);
        }

        match &self.default {
            Some(handler) => Route::Default(key, handler),
            None => Route::Unmatched(key),
        }
    }
}

impl std::fmt::Debug for WebhookDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookDispatcher")
            .field("parser", &self.parser)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("default", &self.default.is_some())
            .field("failure_policy", &self.failure_policy)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::webhook::signature;
    use crate::domain::entities::Message;
    use std::sync::Mutex;

    type Calls = Arc<Mutex<Vec<(&'static str, Event)>>>;

    fn recorder(calls: &Calls, name: &'static str) -> impl Fn(Event) -> BoxFuture<'static, HandlerResult> + Send + Sync + 'static {
        let calls = calls.clone();
        move |event| {
            let calls = calls.clone();
            async move {
                calls.lock().unwrap().push((name, event));
                HandlerResult::Ok(())
            }
            .boxed()
        }
    }

    fn names(calls: &Calls) -> Vec<&'static str> {
        calls.lock().unwrap().iter().map(|(name, _)| *name).collect()
    }

    async fn fail(_event: Event) -> HandlerResult {
        Err("boom".into())
    }

    fn text_event() -> Event {
        Event::from_message(Message::text("1", "hello"))
    }

    #[tokio::test]
    async fn test_specific_handler_wins() {
        let calls = Calls::default();
        let mut dispatcher = WebhookDispatcher::new("secret");
        dispatcher.on_message(MessageType::Text, recorder(&calls, "text"));
        dispatcher.on_event(EventType::Message, recorder(&calls, "message"));
        dispatcher.set_default(recorder(&calls, "default"));

        let summary = dispatcher.dispatch(vec![text_event()]).await.unwrap();

        assert_eq!(names(&calls), vec!["text"]);
        assert_eq!(summary.handled, 1);
    }

    #[tokio::test]
    async fn test_event_handler_catches_all_message_types() {
        let calls = Calls::default();
        let mut dispatcher = WebhookDispatcher::new("secret");
        dispatcher.on_message(MessageType::Text, recorder(&calls, "text"));
        dispatcher.on_event(EventType::Message, recorder(&calls, "message"));

        let sticker = Event::from_message(Message::sticker("2", "1", "1"));
        dispatcher.dispatch(vec![sticker, text_event()]).await.unwrap();

        assert_eq!(names(&calls), vec!["message", "text"]);
    }

    #[tokio::test]
    async fn test_default_handler_for_unmatched() {
        let calls = Calls::default();
        let mut dispatcher = WebhookDispatcher::new("secret");
        dispatcher.on_event(EventType::Follow, recorder(&calls, "follow"));
        dispatcher.set_default(recorder(&calls, "default"));

        let summary = dispatcher
            .dispatch(vec![Event::new(EventType::Join), Event::new(EventType::Follow), text_event()])
            .await
            .unwrap();

        assert_eq!(names(&calls), vec!["default", "follow", "default"]);
        assert_eq!(summary.defaulted, 2);
        assert_eq!(summary.handled, 1);
    }

    #[tokio::test]
    async fn test_unmatched_events_do_not_fail() {
        let dispatcher = WebhookDispatcher::new("secret");

        let summary = dispatcher
            .dispatch(vec![text_event(), Event::new(EventType::Unfollow)])
            .await
            .unwrap();

        assert_eq!(summary.unmatched, 2);
        assert_eq!(summary.handled + summary.defaulted, 0);
    }

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[tokio::test]
    async fn test_unmatched_event_logged_once_with_event_key() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .without_time()
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let dispatcher = WebhookDispatcher::new("secret");
        dispatcher
            .dispatch(vec![text_event(), Event::new(EventType::Unfollow)])
            .await
            .unwrap();

        let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = output.lines().filter(|line| line.contains("INFO")).collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("No handler of message and no default handler"));
        assert!(lines[1].contains("No handler of unfollow and no default handler"));
        assert!(!output.contains("message:text"));
    }

    #[tokio::test]
    async fn test_last_registration_wins() {
        let calls = Calls::default();
        let mut dispatcher = WebhookDispatcher::new("secret");
        dispatcher.on_message(MessageType::Text, recorder(&calls, "first"));
        dispatcher.on_message(MessageType::Text, recorder(&calls, "second"));

        dispatcher.dispatch(vec![text_event()]).await.unwrap();

        assert_eq!(dispatcher.handler_count(), 1);
        assert_eq!(names(&calls), vec!["second"]);
    }

    #[tokio::test]
    async fn test_handler_receives_event() {
        let calls = Calls::default();
        let mut dispatcher = WebhookDispatcher::new("secret");
        dispatcher.on_message(MessageType::Text, recorder(&calls, "text"));

        let event = text_event().with_reply_token("token-1");
        dispatcher.dispatch(vec![event.clone()]).await.unwrap();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1, event);
    }

    #[tokio::test]
    async fn test_handler_without_event_argument() {
        let counter = Arc::new(Mutex::new(0));
        let mut dispatcher = WebhookDispatcher::new("secret");
        let seen = counter.clone();
        dispatcher.on_event(EventType::Follow, move |_| {
            let seen = seen.clone();
            async move {
                *seen.lock().unwrap() += 1;
                HandlerResult::Ok(())
            }
        });

        dispatcher.dispatch(vec![Event::new(EventType::Follow)]).await.unwrap();

        assert_eq!(*counter.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_handler_error_aborts_by_default() {
        let calls = Calls::default();
        let mut dispatcher = WebhookDispatcher::new("secret");
        dispatcher.on_event(EventType::Join, fail);
        dispatcher.on_event(EventType::Follow, recorder(&calls, "follow"));

        let result = dispatcher
            .dispatch(vec![Event::new(EventType::Join), Event::new(EventType::Follow)])
            .await;

        match result {
            Err(WebhookError::Handler { key, source }) => {
                assert_eq!(key, HandlerKey::event(EventType::Join));
                assert_eq!(source.to_string(), "boom");
            }
            other => panic!("expected handler error, got {:?}", other),
        }
        assert!(names(&calls).is_empty());
    }

    #[tokio::test]
    async fn test_handler_error_continue_policy() {
        let calls = Calls::default();
        let mut dispatcher = WebhookDispatcher::new("secret").with_failure_policy(HandlerFailurePolicy::Continue);
        dispatcher.on_event(EventType::Join, fail);
        dispatcher.on_event(EventType::Follow, recorder(&calls, "follow"));

        let summary = dispatcher
            .dispatch(vec![Event::new(EventType::Join), Event::new(EventType::Follow)])
            .await
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(names(&calls), vec!["follow"]);
    }

    #[tokio::test]
    async fn test_handle_rejects_bad_signature_before_dispatch() {
        let calls = Calls::default();
        let mut dispatcher = WebhookDispatcher::new("secret");
        dispatcher.set_default(recorder(&calls, "default"));

        let body = r#"{"destination":"U0","events":[{"type":"follow","timestamp":1}]}"#;
        let result = dispatcher.handle(body, "badsig").await;

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
        assert!(names(&calls).is_empty());
    }

    #[tokio::test]
    async fn test_handle_valid_delivery() {
        let calls = Calls::default();
        let mut dispatcher = WebhookDispatcher::new("secret");
        dispatcher.on_message(MessageType::Text, recorder(&calls, "text"));

        let body = r#"{"destination":"U0","events":[{"type":"message","timestamp":1,"message":{"id":"1","type":"text","text":"hi"}}]}"#;
        let sig = signature::sign("secret", body.as_bytes());
        let summary = dispatcher.handle(body, &sig).await.unwrap();

        assert_eq!(summary.handled, 1);
        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].1.message.as_ref().unwrap().text.as_deref(), Some("hi"));
    }
}
