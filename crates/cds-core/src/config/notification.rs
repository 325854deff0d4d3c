//! Notification registry and dispatch configuration.

use serde::{Deserialize, Serialize};

/// Settings used to build the notification registry at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationConfig {
    /// Dispatch destinations as `"kind:destinationURL"` entries,
    /// e.g. `"jabber:http://cds2xmpp:8090"`.
    #[serde(default)]
    pub destinations: Vec<String>,
    /// Base web URL used to build deep links into the UI.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout applied to every outbound dispatch call, in seconds.
    #[serde(default = "default_dispatch_timeout")]
    pub dispatch_timeout_seconds: u64,
    /// Capacity of the transition event queue feeding the notifier.
    #[serde(default = "default_event_buffer")]
    pub event_buffer_size: usize,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            destinations: Vec::new(),
            base_url: default_base_url(),
            dispatch_timeout_seconds: default_dispatch_timeout(),
            event_buffer_size: default_event_buffer(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:9000".to_string()
}

fn default_dispatch_timeout() -> u64 {
    5
}

fn default_event_buffer() -> usize {
    256
}
