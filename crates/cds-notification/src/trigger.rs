//! Fire/suppress decisions for build status transitions.
//!
//! Only the literal policy `"never"` suppresses a success or failure
//! notification. Any other value, including labels such as `"on_success"`
//! or `"change"`, enables it. The previous status is carried by the event
//! but does not take part in the decision.

use cds_entity::build::BuildStatusEvent;
use cds_entity::notification::settings::POLICY_NEVER;
use cds_entity::notification::{NotificationKind, NotificationSet, NotificationSettings};

/// Whether `settings` asks for a notification on this transition.
pub fn should_send(settings: &NotificationSettings, event: &BuildStatusEvent) -> bool {
    let status = event.current_status;

    if status.is_in_progress() {
        return settings.on_start();
    }
    if status.is_success() {
        return settings.on_success() != POLICY_NEVER;
    }
    if status.is_failure() {
        return settings.on_failure() != POLICY_NEVER;
    }
    false
}

/// Kinds of `set` that fire for `event`, each decided independently.
pub fn evaluate<'a>(
    set: &'a NotificationSet,
    event: &BuildStatusEvent,
) -> Vec<(NotificationKind, &'a NotificationSettings)> {
    set.notifications
        .iter()
        .filter(|(_, settings)| should_send(settings, event))
        .map(|(kind, settings)| (*kind, settings))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cds_entity::build::{BuildContext, BuildStatus};
    use cds_entity::notification::{JabberEmailSettings, NotificationTemplate, TatSettings};
    use cds_entity::scope::Scope;

    fn jabber(on_start: bool, on_success: &str, on_failure: &str) -> NotificationSettings {
        NotificationSettings::JabberEmail(JabberEmailSettings {
            on_start,
            on_success: on_success.into(),
            on_failure: on_failure.into(),
            recipients: vec!["1".into(), "2".into()],
            send_to_author: true,
            send_to_groups: true,
            template: NotificationTemplate::new("subject", "body"),
        })
    }

    fn event(current: BuildStatus) -> BuildStatusEvent {
        BuildStatusEvent::new(
            None,
            current,
            BuildContext {
                project: "P".into(),
                application: "A".into(),
                pipeline: "PL".into(),
                environment: "NoEnv".into(),
                build_number: 1,
                status: current,
                triggered_by: None,
            },
        )
    }

    #[test]
    fn test_on_start_fires_when_building() {
        assert!(should_send(&jabber(true, "never", "never"), &event(BuildStatus::Building)));
        assert!(should_send(&jabber(true, "always", "always"), &event(BuildStatus::Building)));
    }

    #[test]
    fn test_on_start_false_suppresses_building() {
        assert!(!should_send(&jabber(false, "always", "always"), &event(BuildStatus::Building)));
    }

    #[test]
    fn test_success_policies() {
        let success = event(BuildStatus::Success);
        assert!(!should_send(&jabber(false, "never", "always"), &success));
        assert!(should_send(&jabber(false, "always", "never"), &success));
        assert!(should_send(&jabber(false, "on_success", "never"), &success));
        assert!(should_send(&jabber(false, "", "never"), &success));
    }

    #[test]
    fn test_failure_policies() {
        let fail = event(BuildStatus::Fail);
        assert!(!should_send(&jabber(true, "always", "never"), &fail));
        assert!(should_send(&jabber(false, "never", "on_failure"), &fail));
    }

    #[test]
    fn test_other_statuses_never_fire() {
        for status in [BuildStatus::Waiting, BuildStatus::Disabled, BuildStatus::Skipped] {
            assert!(!should_send(&jabber(true, "always", "always"), &event(status)));
        }
    }

    #[test]
    fn test_kinds_decided_independently() {
        let set = NotificationSet::new(Scope::new(1, 1, None))
            .with(NotificationKind::Jabber, jabber(false, "never", "always"))
            .with(NotificationKind::Email, jabber(false, "always", "never"))
            .with(
                NotificationKind::Tat,
                NotificationSettings::Tat(TatSettings {
                    on_start: false,
                    on_success: "change".into(),
                    on_failure: "never".into(),
                    topics: vec!["t".into()],
                    template: NotificationTemplate::new("s", ""),
                }),
            );

        let fired: Vec<_> = evaluate(&set, &event(BuildStatus::Success))
            .into_iter()
            .map(|(kind, _)| kind)
            .collect();
        assert_eq!(fired, vec![NotificationKind::Email, NotificationKind::Tat]);

        let fired: Vec<_> = evaluate(&set, &event(BuildStatus::Fail))
            .into_iter()
            .map(|(kind, _)| kind)
            .collect();
        assert_eq!(fired, vec![NotificationKind::Jabber]);
    }
}
