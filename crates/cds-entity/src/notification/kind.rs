//! Channel kind enumeration.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use cds_core::error::AppError;

/// A named notification backend category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    /// Email delivery, recipient based.
    Email,
    /// Jabber/XMPP delivery, recipient based.
    Jabber,
    /// TAT delivery, topic based.
    Tat,
}

impl NotificationKind {
    /// Every recognized kind, in the order reported by the supported-kinds query.
    pub const ALL: [NotificationKind; 3] = [Self::Email, Self::Jabber, Self::Tat];

    /// Return the kind as its wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Jabber => "jabber",
            Self::Tat => "tat",
        }
    }

    /// Whether the kind is addressed by recipients (as opposed to topics).
    pub fn is_recipient_based(&self) -> bool {
        matches!(self, Self::Email | Self::Jabber)
    }

    /// Names of all recognized kinds.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|k| k.as_str()).collect()
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Self::Email),
            "jabber" => Ok(Self::Jabber),
            "tat" => Ok(Self::Tat),
            other => Err(AppError::validation(format!(
                "Unknown notification kind '{other}'"
            ))),
        }
    }
}
