//! Records `tracing` events so tests can check what was logged.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

/// One logged event with its fields rendered as strings.
#[derive(Debug, Clone)]
pub struct LoggedEvent {
    pub level: Level,
    pub fields: BTreeMap<String, String>,
}

impl LoggedEvent {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

/// Events seen since [`capture`] was called.
#[derive(Debug, Clone, Default)]
pub struct Logged(Arc<Mutex<Vec<LoggedEvent>>>);

impl Logged {
    pub fn events(&self) -> Vec<LoggedEvent> {
        self.0.lock().unwrap().clone()
    }

    /// Events at `level` whose `message` equals `message`.
    pub fn with_message(&self, level: Level, message: &str) -> Vec<LoggedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.level == level && e.field("message") == Some(message))
            .collect()
    }
}

struct FieldVisitor<'a>(&'a mut BTreeMap<String, String>);

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_string(), format!("{value:?}"));
    }
}

struct CaptureLayer(Logged);

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = BTreeMap::new();
        event.record(&mut FieldVisitor(&mut fields));
        self.0.0.lock().unwrap().push(LoggedEvent {
            level: *event.metadata().level(),
            fields,
        });
    }
}

/// Capture events on the current thread until the guard is dropped.
pub fn capture() -> (Logged, DefaultGuard) {
    let logged = Logged::default();
    let subscriber = tracing_subscriber::registry().with(CaptureLayer(logged.clone()));
    let guard = tracing::subscriber::set_default(subscriber);
    (logged, guard)
}
