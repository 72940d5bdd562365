//! Transport-independent progress reporting.
//!
//! Migrators talk to a [`Reporter`]; callers decide where events go by
//! handing in a [`ProgressSink`]: a buffer read after the run, a channel
//! consumed while it runs, or the tracing subscriber.

use model::{
    core::entity::Entity,
    events::progress::{EventLevel, ProgressEvent},
    execution::report::MigrationResult,
};
use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};
use tokio::sync::mpsc;
use tracing::{error, info, warn};

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

/// Collects every event in emission order for batch-mode callers.
#[derive(Default)]
pub struct BufferedSink {
    events: Mutex<Vec<ProgressEvent>>,
}

impl BufferedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ProgressEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn drain(&self) -> Vec<ProgressEvent> {
        std::mem::take(
            &mut *self
                .events
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner()),
        )
    }
}

impl ProgressSink for BufferedSink {
    fn emit(&self, event: ProgressEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event);
    }
}

/// Pushes events to a receiver as they happen.
pub struct ChannelSink {
    tx: mpsc::UnboundedSender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: ProgressEvent) {
        // A dropped receiver means nobody is listening any more.
        let _ = self.tx.send(event);
    }
}

/// Mirrors events into the tracing subscriber.
pub struct TracingSink;

impl ProgressSink for TracingSink {
    fn emit(&self, event: ProgressEvent) {
        let entity = event.entity.as_deref().unwrap_or("-");
        match event.level {
            EventLevel::Info | EventLevel::Success => {
                info!(entity, level = %event.level, "{}", event.message)
            }
            EventLevel::Warning => warn!(entity, "{}", event.message),
            EventLevel::Error => error!(entity, "{}", event.message),
        }
    }
}

/// Sends every event to each inner sink, in order.
pub struct FanoutSink {
    sinks: Vec<Arc<dyn ProgressSink>>,
}

impl FanoutSink {
    pub fn new(sinks: Vec<Arc<dyn ProgressSink>>) -> Self {
        Self { sinks }
    }
}

impl ProgressSink for FanoutSink {
    fn emit(&self, event: ProgressEvent) {
        if let Some((last, rest)) = self.sinks.split_last() {
            for sink in rest {
                sink.emit(event.clone());
            }
            last.emit(event);
        }
    }
}

/// Handle migrators use to emit events, optionally scoped to one entity.
#[derive(Clone)]
pub struct Reporter {
    sink: Arc<dyn ProgressSink>,
    entity: Option<Entity>,
}

impl Reporter {
    pub fn new(sink: Arc<dyn ProgressSink>) -> Self {
        Self { sink, entity: None }
    }

    /// A reporter that drops everything.
    pub fn silent() -> Self {
        Self::new(Arc::new(FanoutSink::new(Vec::new())))
    }

    pub fn for_entity(&self, entity: Entity) -> Self {
        Self {
            sink: Arc::clone(&self.sink),
            entity: Some(entity),
        }
    }

    pub fn emit(&self, level: EventLevel, message: impl Into<String>) {
        let mut event = ProgressEvent::new(level, message);
        if let Some(entity) = self.entity {
            event = event.with_entity(entity.as_str());
        }
        self.sink.emit(event);
    }

    pub fn info(&self, message: impl Into<String>) {
        self.emit(EventLevel::Info, message);
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.emit(EventLevel::Warning, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(EventLevel::Error, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.emit(EventLevel::Success, message);
    }

    /// Emits a status event carrying per-entity counts.
    pub fn status(
        &self,
        level: EventLevel,
        message: impl Into<String>,
        status: BTreeMap<String, MigrationResult>,
    ) {
        let mut event = ProgressEvent::new(level, message).with_status(status);
        if let Some(entity) = self.entity {
            event = event.with_entity(entity.as_str());
        }
        self.sink.emit(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_test::traced_test;

    #[test]
    fn test_buffered_sink_preserves_order() {
        let sink = Arc::new(BufferedSink::new());
        let reporter = Reporter::new(sink.clone());
        reporter.info("starting");
        reporter.for_entity(Entity::Users).warning("row skipped");
        reporter.success("done");

        let events = sink.events();
        let messages: Vec<_> = events.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["starting", "row skipped", "done"]);
        assert_eq!(events[1].entity.as_deref(), Some("users"));
        assert_eq!(events[1].level, EventLevel::Warning);
        assert!(events[0].entity.is_none());

        assert_eq!(sink.drain().len(), 3);
        assert!(sink.events().is_empty());
    }

    #[tokio::test]
    async fn test_channel_sink_pushes_events() {
        let (sink, mut rx) = ChannelSink::new();
        let reporter = Reporter::new(Arc::new(sink));
        reporter.error("boom");
        let event = rx.recv().await.unwrap();
        assert_eq!(event.message, "boom");
        assert!(event.is_error());
    }

    #[test]
    fn test_status_event_carries_counts() {
        let sink = Arc::new(BufferedSink::new());
        let mut status = BTreeMap::new();
        status.insert("geography".to_string(), MigrationResult::new(5, 0));
        Reporter::new(sink.clone()).status(EventLevel::Success, "summary", status);
        let events = sink.events();
        assert_eq!(events[0].status.as_ref().unwrap()["geography"].success_count, 5);
    }

    #[traced_test]
    #[test]
    fn test_fanout_reaches_tracing_and_buffer() {
        let buffer = Arc::new(BufferedSink::new());
        let fanout = FanoutSink::new(vec![
            buffer.clone() as Arc<dyn ProgressSink>,
            Arc::new(TracingSink),
        ]);
        Reporter::new(Arc::new(fanout))
            .for_entity(Entity::Partners)
            .warning("duplicate tax id dropped");
        assert_eq!(buffer.events().len(), 1);
        assert!(logs_contain("duplicate tax id dropped"));
    }
}
