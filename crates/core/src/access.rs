//! Role assignment from the staff allow-list.
//!
//! The allow-list is a versioned JSON document loaded at startup:
//!
//! ```json
//! {
//!   "version": 1,
//!   "admins": ["mayor@city.gov"],
//!   "departments": { "DEPT_WATER": ["water@city.gov"] }
//! }
//! ```
//!
//! Emails are compared case-insensitively. An email listed as admin wins over
//! any department listing.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::issue::Department;

/// Allow-list document versions this build understands.
pub const SUPPORTED_ACCESS_LIST_VERSIONS: &[u32] = &[1];

pub const ROLE_USER: &str = "user";
pub const ROLE_DEPARTMENT: &str = "department";
pub const ROLE_ADMIN: &str = "admin";

/// Role of an authenticated identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Department,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => ROLE_USER,
            Role::Department => ROLE_DEPARTMENT,
            Role::Admin => ROLE_ADMIN,
        }
    }

    /// Admins and department staff may triage issues.
    pub fn is_staff(self) -> bool {
        matches!(self, Role::Department | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role and optional department resolved for one email.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Assignment {
    pub role: Role,
    pub department: Option<Department>,
}

impl Assignment {
    /// Whether this identity may change the status of an issue owned by `department`.
    pub fn can_triage(&self, department: Department) -> bool {
        match self.role {
            Role::Admin => true,
            Role::Department => self.department == Some(department),
            Role::User => false,
        }
    }
}

/// Raw on-disk shape of the allow-list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AccessListDocument {
    version: u32,
    #[serde(default)]
    admins: Vec<String>,
    #[serde(default)]
    departments: BTreeMap<String, Vec<String>>,
}

/// Parsed, lookup-ready allow-list.
#[derive(Debug, Clone, Default)]
pub struct AccessList {
    version: u32,
    admins: Vec<String>,
    staff: HashMap<String, Department>,
}

impl AccessList {
    /// An allow-list with no staff: everybody is a plain user.
    pub fn empty() -> Self {
        Self {
            version: SUPPORTED_ACCESS_LIST_VERSIONS[0],
            ..Self::default()
        }
    }

    /// Parse and validate an allow-list JSON document.
    ///
    /// Rejects unsupported versions and emails assigned to more than one
    /// department.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let doc: AccessListDocument = serde_json::from_str(json)
            .map_err(|e| CoreError::Validation(format!("Invalid access list: {e}")))?;

        if !SUPPORTED_ACCESS_LIST_VERSIONS.contains(&doc.version) {
            return Err(CoreError::Validation(format!(
                "Unsupported access list version {} (supported: {SUPPORTED_ACCESS_LIST_VERSIONS:?})",
                doc.version
            )));
        }

        let admins = doc.admins.iter().map(|e| normalize_email(e)).collect();

        let mut staff = HashMap::new();
        for (name, emails) in doc.departments {
            let department: Department = name.parse()?;
            for email in emails {
                let email = normalize_email(&email);
                if let Some(existing) = staff.insert(email.clone(), department) {
                    if existing != department {
                        return Err(CoreError::Validation(format!(
                            "Email '{email}' is listed under both {existing} and {department}"
                        )));
                    }
                }
            }
        }

        Ok(Self {
            version: doc.version,
            admins,
            staff,
        })
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    /// Resolve the role and department for an email.
    pub fn resolve(&self, email: &str) -> Assignment {
        let email = normalize_email(email);
        if self.admins.contains(&email) {
            return Assignment {
                role: Role::Admin,
                department: None,
            };
        }
        match self.staff.get(&email) {
            Some(department) => Assignment {
                role: Role::Department,
                department: Some(*department),
            },
            None => Assignment {
                role: Role::User,
                department: None,
            },
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
