//! Per-kind notification settings.
//!
//! Settings are a tagged union with an explicit `type` discriminant. The
//! store persists the discriminant next to an opaque kind-specific payload.

use serde::{Deserialize, Serialize};

use super::kind::NotificationKind;

/// Policy literal that suppresses a success or failure notification.
pub const POLICY_NEVER: &str = "never";

/// Policy literal used when a settings document omits a policy.
pub const POLICY_ALWAYS: &str = "always";

/// Subject/body pair rendered against the build context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationTemplate {
    /// Message title.
    #[serde(default)]
    pub subject: String,
    /// Message body.
    #[serde(default)]
    pub body: String,
}

impl NotificationTemplate {
    /// Create a template.
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// A template with neither subject nor body references no content.
    pub fn is_empty(&self) -> bool {
        self.subject.trim().is_empty() && self.body.trim().is_empty()
    }
}

/// Settings for recipient-addressed kinds (jabber, email).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JabberEmailSettings {
    #[serde(default)]
    pub on_start: bool,
    #[serde(default = "default_policy")]
    pub on_success: String,
    #[serde(default = "default_policy")]
    pub on_failure: String,
    /// Explicit recipients, in delivery order.
    #[serde(default)]
    pub recipients: Vec<String>,
    /// Also notify the user who triggered the build.
    #[serde(default)]
    pub send_to_author: bool,
    /// Also notify members of the groups owning the application.
    #[serde(default)]
    pub send_to_groups: bool,
    pub template: NotificationTemplate,
}

/// Settings for topic-addressed kinds (tat).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TatSettings {
    #[serde(default)]
    pub on_start: bool,
    #[serde(default = "default_policy")]
    pub on_success: String,
    #[serde(default = "default_policy")]
    pub on_failure: String,
    /// Topics the message is posted to, in order.
    #[serde(default)]
    pub topics: Vec<String>,
    pub template: NotificationTemplate,
}

/// Settings attached to one notification kind within a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationSettings {
    /// Recipient-based settings.
    JabberEmail(JabberEmailSettings),
    /// Topic-based settings.
    Tat(TatSettings),
}

impl NotificationSettings {
    /// Whether a start notification is requested.
    pub fn on_start(&self) -> bool {
        match self {
            Self::JabberEmail(s) => s.on_start,
            Self::Tat(s) => s.on_start,
        }
    }

    /// Success policy literal.
    pub fn on_success(&self) -> &str {
        match self {
            Self::JabberEmail(s) => &s.on_success,
            Self::Tat(s) => &s.on_success,
        }
    }

    /// Failure policy literal.
    pub fn on_failure(&self) -> &str {
        match self {
            Self::JabberEmail(s) => &s.on_failure,
            Self::Tat(s) => &s.on_failure,
        }
    }

    pub fn template(&self) -> &NotificationTemplate {
        match self {
            Self::JabberEmail(s) => &s.template,
            Self::Tat(s) => &s.template,
        }
    }

    /// Name of the discriminant as persisted.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::JabberEmail(_) => "jabber_email",
            Self::Tat(_) => "tat",
        }
    }

    /// Whether this variant may be stored under `kind`.
    pub fn accepts_kind(&self, kind: NotificationKind) -> bool {
        match self {
            Self::JabberEmail(_) => kind.is_recipient_based(),
            Self::Tat(_) => kind == NotificationKind::Tat,
        }
    }
}

fn default_policy() -> String {
    POLICY_ALWAYS.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tagged_deserialization() {
        let raw = r#"{
            "type": "jabber_email",
            "on_start": true,
            "on_success": "on_success",
            "recipients": ["b", "a"],
            "send_to_author": true,
            "template": {"subject": "s", "body": "b"}
        }"#;
        let settings: NotificationSettings = serde_json::from_str(raw).unwrap();
        let NotificationSettings::JabberEmail(s) = &settings else {
            panic!("expected jabber_email settings");
        };
        assert!(s.on_start);
        assert_eq!(s.on_failure, POLICY_ALWAYS);
        assert_eq!(s.recipients, vec!["b", "a"]);
        assert!(!s.send_to_groups);
        assert_eq!(settings.on_success(), "on_success");
    }

    #[test]
    fn test_kind_variant_consistency() {
        let tat = NotificationSettings::Tat(TatSettings {
            on_start: false,
            on_success: "never".into(),
            on_failure: "always".into(),
            topics: vec!["cds".into()],
            template: NotificationTemplate::new("s", ""),
        });
        assert!(tat.accepts_kind(NotificationKind::Tat));
        assert!(!tat.accepts_kind(NotificationKind::Jabber));
        assert_eq!(tat.type_name(), "tat");
    }

    #[test]
    fn test_empty_template() {
        assert!(NotificationTemplate::new(" ", "").is_empty());
        assert!(!NotificationTemplate::new("", "body").is_empty());
    }
}
