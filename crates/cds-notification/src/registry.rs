//! Process-wide kind → destination table.

use std::collections::HashMap;

use tracing::info;

use cds_core::config::NotificationConfig;
use cds_core::error::AppError;
use cds_core::result::AppResult;
use cds_entity::notification::NotificationKind;

/// Dispatch destinations per kind plus the web base URL used for deep links.
///
/// Built once at startup and shared read-only behind an `Arc`.
#[derive(Debug, Clone)]
pub struct NotificationRegistry {
    destinations: HashMap<NotificationKind, String>,
    base_url: String,
}

impl NotificationRegistry {
    /// Build a registry from `"kind:destinationURL"` entries.
    pub fn new<I, S>(entries: I, base_url: impl Into<String>) -> AppResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut destinations = HashMap::new();
        for entry in entries {
            let (kind, url) = parse_entry(entry.as_ref())?;
            if destinations.insert(kind, url).is_some() {
                return Err(AppError::configuration(format!(
                    "Destination for kind '{kind}' registered twice"
                )));
            }
        }

        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!(
            kinds = ?destinations.keys().map(|k| k.as_str()).collect::<Vec<_>>(),
            base_url = %base_url,
            "Notification registry initialized"
        );
        Ok(Self {
            destinations,
            base_url,
        })
    }

    pub fn from_config(config: &NotificationConfig) -> AppResult<Self> {
        Self::new(&config.destinations, config.base_url.clone())
    }

    /// Destination registered for `kind`.
    pub fn lookup(&self, kind: NotificationKind) -> AppResult<&str> {
        self.destinations
            .get(&kind)
            .map(String::as_str)
            .ok_or_else(|| AppError::not_found(format!("No destination registered for '{kind}'")))
    }

    /// Root of human-facing deep links.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_registered(&self, kind: NotificationKind) -> bool {
        self.destinations.contains_key(&kind)
    }
}

fn parse_entry(entry: &str) -> AppResult<(NotificationKind, String)> {
    let (kind, url) = entry.trim().split_once(':').ok_or_else(|| {
        AppError::configuration(format!(
            "Destination '{entry}' must look like 'kind:http://host:port'"
        ))
    })?;
    let kind: NotificationKind = kind
        .parse()
        .map_err(|e: AppError| AppError::configuration(e.message))?;
    let url = url.trim().trim_end_matches('/');
    if url.is_empty() {
        return Err(AppError::configuration(format!(
            "Destination for kind '{kind}' has no URL"
        )));
    }
    Ok((kind, url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cds_core::error::ErrorKind;

    #[test]
    fn test_lookup_registered_kind() {
        let registry = NotificationRegistry::new(
            ["jabber:http://127.0.0.1:8085/", "tat:http://tat.local"],
            "http://localhost:9000/",
        )
        .unwrap();
        assert_eq!(
            registry.lookup(NotificationKind::Jabber).unwrap(),
            "http://127.0.0.1:8085"
        );
        assert_eq!(registry.base_url(), "http://localhost:9000");
        let err = registry.lookup(NotificationKind::Email).unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[test]
    fn test_rejects_malformed_entries() {
        for bad in ["jabber", "irc:http://x", "jabber:", "email:http://a,email:http://b"] {
            let entries: Vec<&str> = bad.split(',').collect();
            let err = NotificationRegistry::new(entries, "http://x").unwrap_err();
            assert_eq!(err.kind, ErrorKind::Configuration, "entry {bad}");
        }
    }

    #[test]
    fn test_isolated_registries() {
        let a = NotificationRegistry::new(["email:http://a"], "http://a").unwrap();
        let b = NotificationRegistry::new(Vec::<String>::new(), "http://b").unwrap();
        assert!(a.is_registered(NotificationKind::Email));
        assert!(!b.is_registered(NotificationKind::Email));
    }
}
