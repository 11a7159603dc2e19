//! Issue vocabularies, department routing, and the status transition table.
//!
//! Every enum here round-trips through the lowercase text stored in the
//! `issues` table (`as_str` / `FromStr`) and through JSON via serde, so an
//! unknown value is rejected at the boundary instead of deep in a handler.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Validation constants
// ---------------------------------------------------------------------------

/// Maximum length for the free-text description (characters).
pub const MAX_DESCRIPTION_LENGTH: usize = 2_000;

/// Maximum length for the landmark / address fields (characters).
pub const MAX_LANDMARK_LENGTH: usize = 300;

/// Maximum length of a single comment (characters).
pub const MAX_COMMENT_LENGTH: usize = 1_000;

/// Current revision of the issue record layout (`issues.record_version`).
pub const ISSUE_RECORD_VERSION: i16 = 1;

// ---------------------------------------------------------------------------
// IssueType
// ---------------------------------------------------------------------------

/// Fixed vocabulary of reportable civic problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    BrokenBenches,
    FallenTrees,
    Garbage,
    LeakyPipes,
    OpenManhole,
    Potholes,
    Streetlight,
    Others,
}

impl IssueType {
    pub const ALL: [IssueType; 8] = [
        IssueType::BrokenBenches,
        IssueType::FallenTrees,
        IssueType::Garbage,
        IssueType::LeakyPipes,
        IssueType::OpenManhole,
        IssueType::Potholes,
        IssueType::Streetlight,
        IssueType::Others,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IssueType::BrokenBenches => "broken_benches",
            IssueType::FallenTrees => "fallen_trees",
            IssueType::Garbage => "garbage",
            IssueType::LeakyPipes => "leaky_pipes",
            IssueType::OpenManhole => "open_manhole",
            IssueType::Potholes => "potholes",
            IssueType::Streetlight => "streetlight",
            IssueType::Others => "others",
        }
    }

    /// Human-readable label used in notification text.
    pub fn label(self) -> &'static str {
        match self {
            IssueType::BrokenBenches => "Broken benches",
            IssueType::FallenTrees => "Fallen trees",
            IssueType::Garbage => "Garbage",
            IssueType::LeakyPipes => "Leaky pipes",
            IssueType::OpenManhole => "Open manhole",
            IssueType::Potholes => "Potholes",
            IssueType::Streetlight => "Streetlight",
            IssueType::Others => "Other issue",
        }
    }

    /// The municipal department responsible for this category.
    pub fn department(self) -> Department {
        match self {
            IssueType::LeakyPipes => Department::Water,
            IssueType::Garbage | IssueType::FallenTrees => Department::Environment,
            IssueType::Potholes
            | IssueType::BrokenBenches
            | IssueType::OpenManhole
            | IssueType::Streetlight
            | IssueType::Others => Department::PublicWorks,
        }
    }
}

impl fmt::Display for IssueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IssueType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid issue type '{s}'. Must be one of: {:?}",
                    IssueType::ALL.map(IssueType::as_str)
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// Department
// ---------------------------------------------------------------------------

/// Municipal unit that owns a group of issue categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "DEPT_PWD")]
    PublicWorks,
    #[serde(rename = "DEPT_WATER")]
    Water,
    #[serde(rename = "DEPT_ENV")]
    Environment,
}

impl Department {
    pub const ALL: [Department; 3] = [
        Department::PublicWorks,
        Department::Water,
        Department::Environment,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Department::PublicWorks => "DEPT_PWD",
            Department::Water => "DEPT_WATER",
            Department::Environment => "DEPT_ENV",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Department {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Department::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid department '{s}'. Must be one of: {:?}",
                    Department::ALL.map(Department::as_str)
                ))
            })
    }
}

// ---------------------------------------------------------------------------
// IssueStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueStatus {
    Open,
    #[serde(rename = "inprogress")]
    InProgress,
    Resolved,
}

impl IssueStatus {
    pub const ALL: [IssueStatus; 3] = [
        IssueStatus::Open,
        IssueStatus::InProgress,
        IssueStatus::Resolved,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            IssueStatus::Open => "open",
            IssueStatus::InProgress => "inprogress",
            IssueStatus::Resolved => "resolved",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            IssueStatus::Open => "Open",
            IssueStatus::InProgress => "In Progress",
            IssueStatus::Resolved => "Resolved",
        }
    }

    /// Statuses this status may move to.
    ///
    /// - `open`       -> `inprogress`, `resolved`
    /// - `inprogress` -> `resolved`, `open` (undo)
    /// - `resolved`   -> `inprogress`, `open` (re-open)
    pub fn allowed_targets(self) -> &'static [IssueStatus] {
        match self {
            IssueStatus::Open => &[IssueStatus::InProgress, IssueStatus::Resolved],
            IssueStatus::InProgress => &[IssueStatus::Resolved, IssueStatus::Open],
            IssueStatus::Resolved => &[IssueStatus::InProgress, IssueStatus::Open],
        }
    }
}

impl fmt::Display for IssueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IssueStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IssueStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid issue status '{s}'. Must be one of: {:?}",
                    IssueStatus::ALL.map(IssueStatus::as_str)
                ))
            })
    }
}

/// Outcome of checking a requested status change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Target equals the current status; nothing to write.
    NoOp,
    /// A legal change from `from` to `to`.
    Change { from: IssueStatus, to: IssueStatus },
}

/// Check a status change against the transition table.
pub fn plan_transition(current: IssueStatus, target: IssueStatus) -> Result<Transition, CoreError> {
    if current == target {
        return Ok(Transition::NoOp);
    }
    let allowed = current.allowed_targets();
    if allowed.contains(&target) {
        Ok(Transition::Change {
            from: current,
            to: target,
        })
    } else {
        Err(CoreError::Validation(format!(
            "Cannot move issue from '{current}' to '{target}'. Allowed transitions: {:?}",
            allowed.iter().map(|s| s.as_str()).collect::<Vec<_>>()
        )))
    }
}

// ---------------------------------------------------------------------------
// Priority / Criticality
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    pub fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Priority::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                CoreError::Validation(format!(
                    "Invalid priority '{s}'. Must be one of: {:?}",
                    Priority::ALL.map(Priority::as_str)
                ))
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Criticality {
    Normal,
    Critical,
}

impl Criticality {
    pub fn as_str(self) -> &'static str {
        match self {
            Criticality::Normal => "Normal",
            Criticality::Critical => "Critical",
        }
    }
}

// ---------------------------------------------------------------------------
// Field validation
// ---------------------------------------------------------------------------

/// Validate the description length.
pub fn validate_description(description: &str) -> Result<(), CoreError> {
    let len = description.chars().count();
    if len > MAX_DESCRIPTION_LENGTH {
        return Err(CoreError::Validation(format!(
            "Description exceeds maximum length of {MAX_DESCRIPTION_LENGTH} characters (got {len})"
        )));
    }
    Ok(())
}

/// Validate a landmark or address string.
pub fn validate_landmark(landmark: &str) -> Result<(), CoreError> {
    let len = landmark.chars().count();
    if len > MAX_LANDMARK_LENGTH {
        return Err(CoreError::Validation(format!(
            "Landmark exceeds maximum length of {MAX_LANDMARK_LENGTH} characters (got {len})"
        )));
    }
    Ok(())
}

/// Validate comment text. Blank comments are rejected.
pub fn validate_comment(text: &str) -> Result<(), CoreError> {
    if text.trim().is_empty() {
        return Err(CoreError::Validation("Comment text must not be empty".into()));
    }
    let len = text.chars().count();
    if len > MAX_COMMENT_LENGTH {
        return Err(CoreError::Validation(format!(
            "Comment exceeds maximum length of {MAX_COMMENT_LENGTH} characters (got {len})"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
