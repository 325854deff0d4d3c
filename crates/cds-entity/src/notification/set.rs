//! The full notification configuration of one scope.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use cds_core::error::AppError;
use cds_core::result::AppResult;

use super::kind::NotificationKind;
use super::settings::NotificationSettings;
use crate::scope::Scope;

/// Mapping from kind to settings, bound to one [`Scope`].
///
/// At most one settings instance exists per kind. Writing a set replaces
/// whatever the scope held before; kinds are never merged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawNotificationSet")]
pub struct NotificationSet {
    pub scope: Scope,
    pub notifications: BTreeMap<NotificationKind, NotificationSettings>,
}

/// Wire shape of a set before kind names are checked.
#[derive(Debug, Clone, Deserialize)]
pub struct RawNotificationSet {
    pub scope: Scope,
    #[serde(default)]
    pub notifications: BTreeMap<String, NotificationSettings>,
}

impl NotificationSet {
    /// Create an empty set for a scope.
    pub fn new(scope: Scope) -> Self {
        Self {
            scope,
            notifications: BTreeMap::new(),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, kind: NotificationKind, settings: NotificationSettings) -> Self {
        self.notifications.insert(kind, settings);
        self
    }

    /// Build a set from kind names, rejecting unknown kinds.
    pub fn from_named(
        scope: Scope,
        notifications: BTreeMap<String, NotificationSettings>,
    ) -> AppResult<Self> {
        let mut set = Self::new(scope);
        for (name, settings) in notifications {
            let kind: NotificationKind = name.parse()?;
            set.notifications.insert(kind, settings);
        }
        set.validate()?;
        Ok(set)
    }

    /// Check every entry can be persisted.
    pub fn validate(&self) -> AppResult<()> {
        for (kind, settings) in &self.notifications {
            if !settings.accepts_kind(*kind) {
                return Err(AppError::validation(format!(
                    "Kind '{kind}' cannot hold '{}' settings",
                    settings.type_name()
                )));
            }
            if settings.template().is_empty() {
                return Err(AppError::validation(format!(
                    "Template for kind '{kind}' has neither subject nor body"
                )));
            }
        }
        Ok(())
    }

    pub fn get(&self, kind: NotificationKind) -> Option<&NotificationSettings> {
        self.notifications.get(&kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = NotificationKind> + '_ {
        self.notifications.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.notifications.is_empty()
    }

    pub fn len(&self) -> usize {
        self.notifications.len()
    }
}

impl TryFrom<RawNotificationSet> for NotificationSet {
    type Error = AppError;

    fn try_from(raw: RawNotificationSet) -> Result<Self, Self::Error> {
        Self::from_named(raw.scope, raw.notifications)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::settings::{JabberEmailSettings, NotificationTemplate, TatSettings};
    use cds_core::error::ErrorKind;

    fn jabber() -> NotificationSettings {
        NotificationSettings::JabberEmail(JabberEmailSettings {
            on_start: true,
            on_success: "on_success".into(),
            on_failure: "on_failure".into(),
            recipients: vec!["1".into(), "2".into()],
            send_to_author: true,
            send_to_groups: true,
            template: NotificationTemplate::new("subject", "body"),
        })
    }

    fn tat() -> NotificationSettings {
        NotificationSettings::Tat(TatSettings {
            on_start: true,
            on_success: "on_success__".into(),
            on_failure: "on_failure__".into(),
            topics: vec!["1".into(), "2".into()],
            template: NotificationTemplate::new("template", ""),
        })
    }

    #[test]
    fn test_validate_rejects_mismatched_variant() {
        let set = NotificationSet::new(Scope::new(1, 2, None)).with(NotificationKind::Email, tat());
        let err = set.validate().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Validation);
    }

    #[test]
    fn test_validate_rejects_empty_template() {
        let mut settings = jabber();
        if let NotificationSettings::JabberEmail(s) = &mut settings {
            s.template = NotificationTemplate::default();
        }
        let set = NotificationSet::new(Scope::new(1, 2, None))
            .with(NotificationKind::Jabber, settings);
        assert!(set.validate().is_err());
    }

    #[test]
    fn test_unknown_kind_rejected_on_deserialize() {
        let raw = r#"{
            "scope": {"application_id": 1, "pipeline_id": 2},
            "notifications": {
                "irc": {"type": "tat", "template": {"subject": "s"}}
            }
        }"#;
        let err = serde_json::from_str::<NotificationSet>(raw).unwrap_err();
        assert!(err.to_string().contains("irc"));
    }

    #[test]
    fn test_json_preserves_order_and_kinds() {
        let set = NotificationSet::new(Scope::new(1, 2, Some(5)))
            .with(NotificationKind::Jabber, jabber())
            .with(NotificationKind::Tat, tat());
        let json = serde_json::to_string(&set).unwrap();
        let back: NotificationSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
        assert_eq!(
            back.kinds().collect::<Vec<_>>(),
            vec![NotificationKind::Jabber, NotificationKind::Tat]
        );
    }
}
