//! Notification fan-out planning for issue status changes.
//!
//! [`plan_status_fan_out`] decides who hears about a transition and what each
//! recipient is told. Persistence and email queuing happen in the API layer;
//! this module only orders recipients and composes text.

use std::collections::HashSet;

use crate::issue::{IssueStatus, IssueType};

/// Notification `kind` written for status transitions.
pub const KIND_STATUS_UPDATE: &str = "status_update";

/// Why a recipient is being notified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecipientRole {
    /// The identity that submitted the issue.
    Submitter,
    /// An identity in the issue's liker set.
    Supporter,
}

/// One composed notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedNotification {
    pub recipient: String,
    pub role: RecipientRole,
    pub message: String,
    pub email_subject: String,
}

/// The facts about an issue a status notification needs.
#[derive(Debug, Clone, Copy)]
pub struct IssueContext<'a> {
    pub issue_type: IssueType,
    pub landmark: Option<&'a str>,
    pub submitter: &'a str,
}

/// Plan the notifications for a status change.
///
/// The submitter comes first, followed by likers in the order given (stored
/// insertion order). Likers equal to the submitter, blank identities, and
/// repeated identities are skipped.
pub fn plan_status_fan_out<'a, I>(
    issue: IssueContext<'_>,
    previous: IssueStatus,
    current: IssueStatus,
    likers: I,
) -> Vec<PlannedNotification>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<&str> = HashSet::new();
    let mut planned = Vec::new();

    seen.insert(issue.submitter);
    planned.push(PlannedNotification {
        recipient: issue.submitter.to_string(),
        role: RecipientRole::Submitter,
        message: submitter_message(&issue, previous, current),
        email_subject: email_subject(&issue, current),
    });

    for liker in likers {
        let liker = liker.trim();
        if liker.is_empty() || !seen.insert(liker) {
            continue;
        }
        planned.push(PlannedNotification {
            recipient: liker.to_string(),
            role: RecipientRole::Supporter,
            message: supporter_message(&issue, current),
            email_subject: email_subject(&issue, current),
        });
    }

    planned
}

fn place(issue: &IssueContext<'_>) -> String {
    match issue.landmark.map(str::trim).filter(|l| !l.is_empty()) {
        Some(landmark) => format!(" near {landmark}"),
        None => String::new(),
    }
}

fn submitter_message(issue: &IssueContext<'_>, previous: IssueStatus, current: IssueStatus) -> String {
    format!(
        "Your reported issue \"{}\"{} was updated from {} to {}.",
        issue.issue_type.label(),
        place(issue),
        previous.label(),
        current.label(),
    )
}

fn supporter_message(issue: &IssueContext<'_>, current: IssueStatus) -> String {
    format!(
        "An issue you supported, \"{}\"{}, is now {}.",
        issue.issue_type.label(),
        place(issue),
        current.label(),
    )
}

fn email_subject(issue: &IssueContext<'_>, current: IssueStatus) -> String {
    format!(
        "[Community Portal] {} is now {}",
        issue.issue_type.label(),
        current.label()
    )
}
