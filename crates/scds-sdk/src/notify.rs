//! Change notification.
//!
//! After every committed revision the SDK hands the object and revision to
//! a [`Notifier`]. Notification is best effort: a failure is logged by the
//! caller and never undoes or fails the write.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use scds_store::{StoreError, SubscriberStore};
use scds_types::{Object, Revision};

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("cannot load subscribers: {0}")]
    Store(#[from] StoreError),

    #[error("cannot render notification: {0}")]
    Render(#[from] serde_json::Error),

    #[error("cannot deliver to {recipient}: {reason}")]
    Delivery { recipient: String, reason: String },
}

/// Receives every committed revision.
pub trait Notifier: Send + Sync {
    fn notify(&self, object: &Object, revision: &Revision) -> Result<(), NotifyError>;
}

/// Discards every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn notify(&self, _object: &Object, _revision: &Revision) -> Result<(), NotifyError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Subject and text body describing one revision.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

impl Notification {
    pub const NEW_OBJECT: &'static str = "[SCDS] New Object";
    pub const OBJECT_CHANGED: &'static str = "[SCDS] Object Changed";

    /// Render the notification for `revision` of `object`. Links are built
    /// from `base_url`, e.g. `http://localhost:5000`.
    pub fn for_revision(
        base_url: &str,
        object: &Object,
        revision: &Revision,
    ) -> Result<Self, NotifyError> {
        let base = base_url.trim_end_matches('/');
        let key = &object.key;
        let version = revision.version;
        let mut body = format!(
            "Key: {key}\nVersion: {version}\nTime: {}\nURL: {base}/objects/{key}\nVersion URL: {base}/objects/{key}/v/{version}\n",
            format_time(revision.time),
        );

        if version == 1 {
            body.push_str(&section("Object", &object.value)?);
            return Ok(Self {
                subject: Self::NEW_OBJECT.to_string(),
                body,
            });
        }

        if !revision.changes.is_empty() {
            body.push_str(&section("Changes", &revision.changes)?);
        }
        if !revision.additions.is_empty() {
            body.push_str(&section("Additions", &revision.additions)?);
        }
        if !revision.removals.is_empty() {
            body.push_str(&section("Removals", &revision.removals)?);
        }
        Ok(Self {
            subject: Self::OBJECT_CHANGED.to_string(),
            body,
        })
    }
}

fn section(title: &str, content: &impl Serialize) -> Result<String, NotifyError> {
    let rendered = serde_json::to_string_pretty(content)?;
    Ok(format!("\n# {title}\n\n{rendered}\n"))
}

fn format_time(time: i64) -> String {
    DateTime::<Utc>::from_timestamp(time, 0)
        .map(|t| t.to_rfc3339())
        .unwrap_or_else(|| time.to_string())
}

/// One outbound message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivers messages.
pub trait Mailer: Send + Sync {
    fn send(&self, message: &Message) -> Result<(), NotifyError>;
}

/// Writes messages to the log instead of delivering them.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    fn send(&self, message: &Message) -> Result<(), NotifyError> {
        info!(from = %message.from, to = %message.to, subject = %message.subject, "notification");
        debug!(body = %message.body, "notification body");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// SubscriberNotifier
// ---------------------------------------------------------------------------

/// Sends one message per subscriber through a [`Mailer`].
pub struct SubscriberNotifier<M: Mailer> {
    subscribers: Arc<dyn SubscriberStore>,
    mailer: M,
    from: String,
    base_url: String,
}

impl<M: Mailer> SubscriberNotifier<M> {
    pub fn new(
        subscribers: Arc<dyn SubscriberStore>,
        mailer: M,
        from: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            subscribers,
            mailer,
            from: from.into(),
            base_url: base_url.into(),
        }
    }

    pub fn mailer(&self) -> &M {
        &self.mailer
    }
}

impl<M: Mailer> Notifier for SubscriberNotifier<M> {
    /// Delivery failures for single recipients are logged and skipped.
    fn notify(&self, object: &Object, revision: &Revision) -> Result<(), NotifyError> {
        let subscribers = self.subscribers.subscribers()?;
        if subscribers.is_empty() {
            return Ok(());
        }

        let note = Notification::for_revision(&self.base_url, object, revision)?;
        for sub in subscribers {
            let message = Message {
                from: self.from.clone(),
                to: sub.email,
                subject: note.subject.clone(),
                body: note.body.clone(),
            };
            if let Err(e) = self.mailer.send(&message) {
                warn!(recipient = %message.to, error = %e, "notification not delivered");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scds_store::InMemoryStore;
    use scds_types::{Change, Document, ObjectId};
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingMailer {
        sent: Mutex<Vec<Message>>,
        reject: Option<String>,
    }

    impl Mailer for RecordingMailer {
        fn send(&self, message: &Message) -> Result<(), NotifyError> {
            if self.reject.as_deref() == Some(message.to.as_str()) {
                return Err(NotifyError::Delivery {
                    recipient: message.to.clone(),
                    reason: "mailbox full".into(),
                });
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(())
        }
    }

    fn bob_v1() -> (Object, Revision) {
        let mut value = Document::new();
        value.insert("name".into(), json!("Bob"));
        let rev = Revision {
            additions: value.clone(),
            ..Default::default()
        }
        .stamp(1, 0);
        (Object::create("bob", value, rev.clone()), rev)
    }

    fn bob_v2() -> (Object, Revision) {
        let mut rev = Revision::default().stamp(2, 60);
        rev.additions.insert("email".into(), json!("bob@smith.net"));
        rev.changes
            .insert("name".into(), Change::new(json!("Bob"), json!("Robert")));
        let mut obj = Object::empty(ObjectId::new(), "bob");
        obj.value.insert("name".into(), json!("Robert"));
        obj.value.insert("email".into(), json!("bob@smith.net"));
        obj.version = 2;
        obj.time = 60;
        (obj, rev)
    }

    // -----------------------------------------------------------------------
    // Rendering
    // -----------------------------------------------------------------------

    #[test]
    fn new_object_notification() {
        let (obj, rev) = bob_v1();
        let note = Notification::for_revision("http://localhost:5000/", &obj, &rev).unwrap();
        assert_eq!(note.subject, Notification::NEW_OBJECT);
        assert!(note.body.starts_with("Key: bob\nVersion: 1\n"));
        assert!(note.body.contains("Time: 1970-01-01T00:00:00+00:00\n"));
        assert!(note.body.contains("URL: http://localhost:5000/objects/bob\n"));
        assert!(note.body.contains("Version URL: http://localhost:5000/objects/bob/v/1\n"));
        assert!(note.body.contains("# Object"));
        assert!(note.body.contains("\"name\": \"Bob\""));
    }

    #[test]
    fn changed_object_notification_lists_sections() {
        let (obj, rev) = bob_v2();
        let note = Notification::for_revision("http://scds.local", &obj, &rev).unwrap();
        assert_eq!(note.subject, Notification::OBJECT_CHANGED);
        assert!(note.body.contains("Version URL: http://scds.local/objects/bob/v/2\n"));
        assert!(note.body.contains("# Changes"));
        assert!(note.body.contains("\"after\": \"Robert\""));
        assert!(note.body.contains("# Additions"));
        assert!(!note.body.contains("# Removals"));
        assert!(!note.body.contains("# Object"));
    }

    #[test]
    fn body_layout_is_exact() {
        let (obj, rev) = bob_v1();
        let note = Notification::for_revision("http://localhost:5000", &obj, &rev).unwrap();
        assert_eq!(
            note.body,
            "Key: bob\n\
             Version: 1\n\
             Time: 1970-01-01T00:00:00+00:00\n\
             URL: http://localhost:5000/objects/bob\n\
             Version URL: http://localhost:5000/objects/bob/v/1\n\
             \n\
             # Object\n\
             \n\
             {\n  \"name\": \"Bob\"\n}\n"
        );
    }

    // -----------------------------------------------------------------------
    // Delivery
    // -----------------------------------------------------------------------

    #[test]
    fn no_subscribers_sends_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let notifier =
            SubscriberNotifier::new(store, RecordingMailer::default(), "scds@localhost", "http://x");
        let (obj, rev) = bob_v1();
        notifier.notify(&obj, &rev).unwrap();
        assert!(notifier.mailer().sent.lock().unwrap().is_empty());
    }

    #[test]
    fn one_message_per_subscriber() {
        let store = Arc::new(InMemoryStore::new());
        store.upsert_subscriber("alice@example.com").unwrap();
        store.upsert_subscriber("bob@example.com").unwrap();

        let notifier =
            SubscriberNotifier::new(store, RecordingMailer::default(), "scds@localhost", "http://x");
        let (obj, rev) = bob_v1();
        notifier.notify(&obj, &rev).unwrap();

        let sent = notifier.mailer().sent.lock().unwrap();
        let to: Vec<_> = sent.iter().map(|m| m.to.as_str()).collect();
        assert_eq!(to, vec!["alice@example.com", "bob@example.com"]);
        assert!(sent.iter().all(|m| m.from == "scds@localhost"));
        assert!(sent.iter().all(|m| m.subject == Notification::NEW_OBJECT));
    }

    #[test]
    fn failed_recipient_does_not_stop_others() {
        let store = Arc::new(InMemoryStore::new());
        store.upsert_subscriber("alice@example.com").unwrap();
        store.upsert_subscriber("bob@example.com").unwrap();
        let mailer = RecordingMailer {
            reject: Some("alice@example.com".into()),
            ..Default::default()
        };

        let notifier = SubscriberNotifier::new(store, mailer, "scds@localhost", "http://x");
        let (obj, rev) = bob_v2();
        notifier.notify(&obj, &rev).unwrap();

        let sent = notifier.mailer().sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "bob@example.com");
    }

    #[test]
    fn log_mailer_accepts_everything() {
        let message = Message {
            from: "a".into(),
            to: "b".into(),
            subject: "c".into(),
            body: "d".into(),
        };
        assert!(LogMailer.send(&message).is_ok());
        assert!(NoopNotifier.notify(&bob_v1().0, &bob_v1().1).is_ok());
    }
}
