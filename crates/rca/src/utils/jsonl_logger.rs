//! Appends every log event to a file as one JSON object per line.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write},
    path::Path,
    sync::{Arc, Mutex, PoisonError},
};
use tracing::{
    Level, Subscriber,
    field::{Field, Visit},
};
use tracing_subscriber::{Layer, layer::Context, registry::LookupSpan};

#[derive(Debug, Serialize)]
struct FileRecord {
    timestamp: DateTime<Local>,
    level: String,
    target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    thread: Option<String>,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    span: Option<String>,
    #[serde(flatten)]
    fields: serde_json::Map<String, serde_json::Value>,
}

#[derive(Clone)]
pub(crate) struct JsonlWriter {
    writer: Arc<Mutex<BufWriter<File>>>,
}

impl JsonlWriter {
    pub(crate) fn new<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;

        Ok(Self {
            writer: Arc::new(Mutex::new(BufWriter::new(file))),
        })
    }

    fn write_record(&self, record: &FileRecord) -> std::io::Result<()> {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        serde_json::to_writer(&mut *writer, record)?;
        writeln!(&mut *writer)?;
        writer.flush()?;
        Ok(())
    }
}

#[derive(Default)]
struct FieldVisitor {
    fields: serde_json::Map<String, serde_json::Value>,
    message: Option<String>,
}

impl FieldVisitor {
    fn insert(&mut self, field: &Field, value: serde_json::Value) {
        if field.name() == "message" {
            self.message = Some(match value {
                serde_json::Value::String(s) => s,
                other => other.to_string(),
            });
        } else {
            self.fields.insert(field.name().to_string(), value);
        }
    }
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        self.insert(field, serde_json::Value::String(format!("{value:?}")));
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.insert(field, serde_json::Value::String(value.to_string()));
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.insert(field, value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.insert(field, value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.insert(field, value.into());
    }
}

pub(crate) struct JsonlLayer {
    writer: JsonlWriter,
}

impl JsonlLayer {
    pub(crate) fn new(writer: JsonlWriter) -> Self {
        Self { writer }
    }
}

impl<S> Layer<S> for JsonlLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let level = metadata.level();

        if *level == Level::TRACE {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let record = FileRecord {
            timestamp: Local::now(),
            level: level.to_string(),
            target: metadata.target().to_string(),
            thread: std::thread::current().name().map(ToString::to_string),
            message: visitor.message.unwrap_or_default(),
            span: ctx.event_span(event).map(|span| span.name().to_string()),
            fields: visitor.fields,
        };

        let _ = self.writer.write_record(&record);
    }
}
