//! Recipient resolution for recipient-based kinds.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use tracing::warn;

use cds_core::result::AppResult;
use cds_entity::build::BuildStatusEvent;
use cds_entity::notification::NotificationSettings;
use cds_entity::scope::Scope;

/// User and group lookups owned by the identity service.
#[async_trait]
pub trait RecipientDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// Address of the user who triggered a build.
    async fn author_address(&self, username: &str) -> AppResult<Option<String>>;

    /// Addresses of every member of the groups owning the scope's application.
    async fn group_members(&self, scope: &Scope) -> AppResult<Vec<String>>;
}

/// Directory backed by fixed tables. Unknown authors resolve to their username.
#[derive(Debug, Default, Clone)]
pub struct StaticDirectory {
    addresses: HashMap<String, String>,
    groups: HashMap<i64, Vec<String>>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_address(mut self, username: impl Into<String>, address: impl Into<String>) -> Self {
        self.addresses.insert(username.into(), address.into());
        self
    }

    /// Members notified for every pipeline of `application_id`.
    pub fn with_group_members(mut self, application_id: i64, members: Vec<String>) -> Self {
        self.groups.insert(application_id, members);
        self
    }
}

#[async_trait]
impl RecipientDirectory for StaticDirectory {
    async fn author_address(&self, username: &str) -> AppResult<Option<String>> {
        Ok(Some(
            self.addresses
                .get(username)
                .cloned()
                .unwrap_or_else(|| username.to_string()),
        ))
    }

    async fn group_members(&self, scope: &Scope) -> AppResult<Vec<String>> {
        Ok(self
            .groups
            .get(&scope.application_id)
            .cloned()
            .unwrap_or_default())
    }
}

/// Final recipient list for one kind.
///
/// Explicit recipients come first, then the author, then group members.
/// Duplicates keep their first position. Topic-based settings address their
/// topics. A directory failure drops only the part it was resolving.
pub async fn resolve_recipients(
    settings: &NotificationSettings,
    scope: &Scope,
    event: &BuildStatusEvent,
    directory: &dyn RecipientDirectory,
) -> Vec<String> {
    let s = match settings {
        NotificationSettings::Tat(tat) => return dedup(tat.topics.iter().cloned()),
        NotificationSettings::JabberEmail(s) => s,
    };

    let mut all = s.recipients.clone();

    if s.send_to_author {
        if let Some(author) = event.context.triggered_by.as_deref() {
            match directory.author_address(author).await {
                Ok(Some(address)) => all.push(address),
                Ok(None) => {}
                Err(e) => warn!(%scope, author, error = %e, "Cannot resolve build author"),
            }
        }
    }

    if s.send_to_groups {
        match directory.group_members(scope).await {
            Ok(members) => all.extend(members),
            Err(e) => warn!(%scope, error = %e, "Cannot resolve group members"),
        }
    }

    dedup(all)
}

fn dedup(items: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| !item.is_empty() && seen.insert(item.clone()))
        .collect()
}
