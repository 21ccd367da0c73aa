//! Log capture for tests.
//!
//! TaskFlow tests assert that a failure was logged at the right level and,
//! sometimes, that it carried the offending record's ID. Events are kept as
//! level, message, and a name → value map of the other fields.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::field::{Field, Visit};
use tracing::level_filters::LevelFilter;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// One captured event.
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    /// Level.
    pub level: Level,
    /// The `message` field.
    pub message: String,
    /// Other fields, `Display`/`Debug` formatted as the macro recorded them.
    pub fields: BTreeMap<&'static str, String>,
}

/// Handle to the events captured by [`capture_logs`].
#[derive(Clone, Default)]
pub struct CapturedLogs {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl CapturedLogs {
    /// Whether any event at `level` has a message containing `needle`.
    pub fn has_event(&self, level: Level, needle: &str) -> bool {
        self.find(level, needle, |_| ()).is_some()
    }

    /// Field `name` of the first event at `level` whose message contains
    /// `needle`.
    pub fn field(&self, level: Level, needle: &str, name: &str) -> Option<String> {
        self.find(level, needle, |e| e.fields.get(name).cloned())
            .flatten()
    }

    /// Number of events at `level`.
    pub fn count_at_level(&self, level: Level) -> usize {
        self.events.lock().iter().filter(|e| e.level == level).count()
    }

    fn find<T>(&self, level: Level, needle: &str, f: impl FnOnce(&CapturedEvent) -> T) -> Option<T> {
        self.events
            .lock()
            .iter()
            .find(|e| e.level == level && e.message.contains(needle))
            .map(f)
    }
}

struct Fields(BTreeMap<&'static str, String>);

impl Visit for Fields {
    fn record_str(&mut self, field: &Field, value: &str) {
        let _ = self.0.insert(field.name(), value.to_owned());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        let _ = self.0.insert(field.name(), format!("{value:?}"));
    }
}

struct CaptureLayer {
    logs: CapturedLogs,
}

impl<S: Subscriber> Layer<S> for CaptureLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut fields = Fields(BTreeMap::new());
        event.record(&mut fields);
        let message = fields.0.remove("message").unwrap_or_default();
        self.logs.events.lock().push(CapturedEvent {
            level: *event.metadata().level(),
            message,
            fields: fields.0,
        });
    }
}

/// Install a thread-local capturing subscriber.
///
/// Keep the returned guard alive for the duration of the test. Under
/// `#[tokio::test]` the default current-thread runtime keeps every task on
/// the test thread, so spawned work is captured too.
pub fn capture_logs() -> (CapturedLogs, tracing::subscriber::DefaultGuard) {
    let logs = CapturedLogs::default();
    let subscriber = tracing_subscriber::registry()
        .with(CaptureLayer { logs: logs.clone() })
        .with(LevelFilter::TRACE);
    (logs, subscriber.set_default())
}
