//! Authority roles and their permissions
//!
//! Four kinds of authority exist. Each has a fixed permission set:
//!
//! | Kind | issue | approve | create events | delete events |
//! |------|-------|---------|---------------|---------------|
//! | admin | yes | yes | yes | yes |
//! | faculty | no | yes | yes | no |
//! | club_organizer | no | no | yes | no |
//! | event_organizer | no | no | yes | no |
//!
//! Only admins manage students/faculty and view analytics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Result, StoreError};

/// Kind of authority account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityKind {
    /// System administrator
    Admin,
    /// Faculty member
    Faculty,
    /// Club organizer
    ClubOrganizer,
    /// General event organizer
    EventOrganizer,
}

impl AuthorityKind {
    /// All kinds
    pub const ALL: [AuthorityKind; 4] = [
        AuthorityKind::Admin,
        AuthorityKind::Faculty,
        AuthorityKind::ClubOrganizer,
        AuthorityKind::EventOrganizer,
    ];

    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthorityKind::Admin => "admin",
            AuthorityKind::Faculty => "faculty",
            AuthorityKind::ClubOrganizer => "club_organizer",
            AuthorityKind::EventOrganizer => "event_organizer",
        }
    }

    /// Full role description for this kind
    pub fn role(&self) -> AuthorityRole {
        let (label, description, permissions) = match self {
            AuthorityKind::Admin => (
                "System Administrator",
                "Full system access and management capabilities",
                Permissions::all(),
            ),
            AuthorityKind::Faculty => (
                "Faculty Member",
                "Can organize events and approve certificates for their events",
                Permissions {
                    can_approve_certificates: true,
                    can_create_events: true,
                    ..Permissions::none()
                },
            ),
            AuthorityKind::ClubOrganizer => (
                "Club Organizer",
                "Can organize club events and activities",
                Permissions {
                    can_create_events: true,
                    ..Permissions::none()
                },
            ),
            AuthorityKind::EventOrganizer => (
                "Event Organizer",
                "Can organize general events and manage registrations",
                Permissions {
                    can_create_events: true,
                    ..Permissions::none()
                },
            ),
        };
        AuthorityRole {
            kind: *self,
            label,
            description,
            permissions,
        }
    }
}

impl fmt::Display for AuthorityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthorityKind {
    type Err = StoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        AuthorityKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| StoreError::UnknownAuthorityKind(s.to_string()))
    }
}

/// A single capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    /// Issue documents directly to students
    IssueCertificates,
    /// Approve or reject student uploads
    ApproveCertificates,
    /// Register events
    CreateEvents,
    /// Manage student accounts
    ManageStudents,
    /// Manage faculty accounts
    ManageFaculty,
    /// Delete events
    DeleteEvents,
    /// View analytics dashboards
    ViewAnalytics,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Permission::IssueCertificates => "issue certificates",
            Permission::ApproveCertificates => "approve certificates",
            Permission::CreateEvents => "create events",
            Permission::ManageStudents => "manage students",
            Permission::ManageFaculty => "manage faculty",
            Permission::DeleteEvents => "delete events",
            Permission::ViewAnalytics => "view analytics",
        };
        f.write_str(s)
    }
}

/// Permission set of a role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Permissions {
    /// May issue documents
    pub can_issue_certificates: bool,
    /// May review uploads
    pub can_approve_certificates: bool,
    /// May create events
    pub can_create_events: bool,
    /// May manage students
    pub can_manage_students: bool,
    /// May manage faculty
    pub can_manage_faculty: bool,
    /// May delete events
    pub can_delete_events: bool,
    /// May view analytics
    pub can_view_analytics: bool,
}

impl Permissions {
    /// Every permission granted
    pub fn all() -> Self {
        Self {
            can_issue_certificates: true,
            can_approve_certificates: true,
            can_create_events: true,
            can_manage_students: true,
            can_manage_faculty: true,
            can_delete_events: true,
            can_view_analytics: true,
        }
    }

    /// No permission granted
    pub fn none() -> Self {
        Self::default()
    }

    /// Whether a permission is granted
    pub fn allows(&self, permission: Permission) -> bool {
        match permission {
            Permission::IssueCertificates => self.can_issue_certificates,
            Permission::ApproveCertificates => self.can_approve_certificates,
            Permission::CreateEvents => self.can_create_events,
            Permission::ManageStudents => self.can_manage_students,
            Permission::ManageFaculty => self.can_manage_faculty,
            Permission::DeleteEvents => self.can_delete_events,
            Permission::ViewAnalytics => self.can_view_analytics,
        }
    }
}

/// A kind together with its label, description and permissions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorityRole {
    /// Kind of authority
    pub kind: AuthorityKind,
    /// Human-readable label
    pub label: &'static str,
    /// What the role may do
    pub description: &'static str,
    /// Granted permissions
    pub permissions: Permissions,
}

impl AuthorityRole {
    /// Fail with `PermissionDenied` unless the permission is granted
    pub fn require(&self, permission: Permission) -> Result<()> {
        if self.permissions.allows(permission) {
            Ok(())
        } else {
            Err(StoreError::PermissionDenied {
                kind: self.kind,
                permission,
            })
        }
    }
}
