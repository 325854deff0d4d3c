//! Notification settings commands.

use std::process::ExitCode;

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use crate::client::ApiClient;
use crate::output::{self, OutputFormat};
use cds_core::config::AppConfig;
use cds_core::error::AppError;
use cds_entity::notification::{NotificationKind, NotificationSettings};
use cds_entity::scope::Scope;

/// Arguments for the notification command
#[derive(Debug, Args)]
pub struct NotificationArgs {
    /// Notification subcommand
    #[command(subcommand)]
    pub command: NotificationCommand,
}

/// Identifies an (application, pipeline, environment) scope.
#[derive(Debug, Args)]
pub struct ScopeArgs {
    /// Application ID
    pub application_id: i64,
    /// Pipeline ID
    pub pipeline_id: i64,
    /// Environment ID, defaults to the "no environment" sentinel
    #[arg(short, long)]
    pub environment_id: Option<i64>,
}

impl ScopeArgs {
    fn scope(&self) -> Scope {
        Scope::new(self.application_id, self.pipeline_id, self.environment_id)
    }
}

/// Notification subcommands
#[derive(Debug, Subcommand)]
pub enum NotificationCommand {
    /// List supported notification kinds
    Types,
    /// Show the settings configured for a scope
    Show(ScopeArgs),
    /// Remove every setting of a scope
    Clear {
        #[command(flatten)]
        scope: ScopeArgs,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct KindRow {
    #[tabled(rename = "Kind")]
    kind: &'static str,
    #[tabled(rename = "Settings")]
    settings: &'static str,
}

#[derive(Debug, Serialize, Tabled)]
struct SettingsRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "On Start")]
    on_start: bool,
    #[tabled(rename = "On Success")]
    on_success: String,
    #[tabled(rename = "On Failure")]
    on_failure: String,
    #[tabled(rename = "Targets")]
    targets: String,
    #[tabled(rename = "Subject")]
    subject: String,
}

impl SettingsRow {
    fn new(kind: NotificationKind, settings: &NotificationSettings) -> Self {
        let targets = match settings {
            NotificationSettings::JabberEmail(s) => {
                let mut targets = s.recipients.clone();
                if s.send_to_author {
                    targets.push("<author>".to_string());
                }
                if s.send_to_groups {
                    targets.push("<groups>".to_string());
                }
                targets
            }
            NotificationSettings::Tat(s) => s.topics.clone(),
        };

        Self {
            kind: kind.to_string(),
            on_start: settings.on_start(),
            on_success: settings.on_success().to_string(),
            on_failure: settings.on_failure().to_string(),
            targets: targets.join(", "),
            subject: settings.template().subject.clone(),
        }
    }
}

/// Execute notification commands
pub async fn execute(
    args: &NotificationArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<ExitCode, AppError> {
    match &args.command {
        NotificationCommand::Types => {
            let rows: Vec<KindRow> = NotificationKind::ALL
                .iter()
                .map(|kind| KindRow {
                    kind: kind.as_str(),
                    settings: if kind.is_recipient_based() {
                        "jabber_email"
                    } else {
                        "tat"
                    },
                })
                .collect();
            output::print_list(&rows, format);
        }
        NotificationCommand::Show(scope_args) => {
            let scope = scope_args.scope();
            let client = ApiClient::new(&config.cli)?;

            match client.notification_set(&scope).await? {
                None => output::print_warning(&format!("No notifications configured for {scope}")),
                Some(set) if format == OutputFormat::Json => output::print_json(&set),
                Some(set) => {
                    output::print_kv("Scope", &scope.to_string());
                    let rows: Vec<SettingsRow> = set
                        .notifications
                        .iter()
                        .map(|(kind, settings)| SettingsRow::new(*kind, settings))
                        .collect();
                    output::print_list(&rows, format);
                }
            }
        }
        NotificationCommand::Clear { scope, force } => {
            let scope = scope.scope();
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Remove all notifications for {scope}?"))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(ExitCode::SUCCESS);
                }
            }

            let client = ApiClient::new(&config.cli)?;
            let deleted = client.delete_notifications(&scope).await?;
            output::print_success(&format!("Removed {deleted} notification(s) for {scope}"));
        }
    }

    Ok(ExitCode::SUCCESS)
}
