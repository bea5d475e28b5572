use chrono::{DateTime, SecondsFormat, Utc};
use facetfence_core::{ContactMessage, Lead};
use serde::Serialize;
use tracing::info;

/// A validated submission ready for the log stream.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "UPPERCASE")]
pub enum IntakeRecord {
    Contact(ContactMessage),
    Lead(Lead),
}

impl IntakeRecord {
    pub fn kind(&self) -> &'static str {
        match self {
            IntakeRecord::Contact(_) => "CONTACT",
            IntakeRecord::Lead(_) => "LEAD",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct IntakeEvent {
    #[serde(flatten)]
    pub record: IntakeRecord,
    pub ts: DateTime<Utc>,
}

impl IntakeEvent {
    pub fn now(record: IntakeRecord) -> Self {
        Self {
            record,
            ts: Utc::now(),
        }
    }

    pub fn timestamp(&self) -> String {
        self.ts.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// Destination for accepted intake submissions.
///
/// Recording is fire-and-forget: submissions are acknowledged once handed to
/// the sink and are never retried.
pub trait IntakeSink: Send + Sync {
    fn record(&self, event: &IntakeEvent);
}

/// Writes each submission as one structured event on the
/// `facetfence::intake` tracing target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl IntakeSink for TracingSink {
    fn record(&self, event: &IntakeEvent) {
        let ts = event.timestamp();
        match &event.record {
            IntakeRecord::Contact(message) => info!(
                target: "facetfence::intake",
                kind = event.record.kind(),
                email = %message.email,
                msg = %message.msg,
                ts = %ts,
                "contact message received"
            ),
            IntakeRecord::Lead(lead) => info!(
                target: "facetfence::intake",
                kind = event.record.kind(),
                email = %lead.email,
                store = %lead.store,
                // Omitted when the form sent no plan.
                plan = lead.plan.as_deref(),
                ts = %ts,
                "lead received"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn event_serializes_with_kind_tag_and_timestamp() {
        let event = IntakeEvent::now(IntakeRecord::Lead(Lead {
            email: "a@b.com".to_string(),
            store: "demo.myshopify.com".to_string(),
            plan: Some("Growth".to_string()),
        }));
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["kind"], "LEAD");
        assert_eq!(value["store"], "demo.myshopify.com");
        assert_eq!(value["plan"], "Growth");
        assert!(value["ts"].as_str().is_some());
        assert!(event.timestamp().ends_with('Z'));
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

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn record_and_capture(event: IntakeEvent) -> Vec<serde_json::Value> {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::INFO)
            .with_writer(logs.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, || TracingSink.record(&event));

        let bytes = logs.0.lock().unwrap().clone();
        String::from_utf8(bytes)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn tracing_sink_emits_one_contact_event() {
        let event = IntakeEvent::now(IntakeRecord::Contact(ContactMessage {
            email: "a@b.com".to_string(),
            msg: "hi".to_string(),
        }));
        let ts = event.timestamp();

        let lines = record_and_capture(event);

        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["target"], "facetfence::intake");
        assert_eq!(lines[0]["level"], "INFO");
        let fields = &lines[0]["fields"];
        assert_eq!(fields["kind"], "CONTACT");
        assert_eq!(fields["email"], "a@b.com");
        assert_eq!(fields["msg"], "hi");
        assert_eq!(fields["ts"], ts.as_str());
    }

    #[test]
    fn tracing_sink_omits_absent_plan_but_keeps_empty_plan() {
        let lead = |plan: Option<&str>| {
            IntakeEvent::now(IntakeRecord::Lead(Lead {
                email: "a@b.com".to_string(),
                store: "demo.myshopify.com".to_string(),
                plan: plan.map(str::to_string),
            }))
        };

        let lines = record_and_capture(lead(None));
        assert_eq!(lines.len(), 1);
        let fields = &lines[0]["fields"];
        assert_eq!(fields["kind"], "LEAD");
        assert_eq!(fields["store"], "demo.myshopify.com");
        assert!(fields.get("plan").is_none());

        let lines = record_and_capture(lead(Some("")));
        assert_eq!(lines[0]["fields"]["plan"], "");
    }
}
