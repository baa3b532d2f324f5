use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::ProgramMembership;

/// Coarse geographic scope of a permission record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PermissionLevel {
    /// Scoped to the listed school codes.
    SingleSchool,
    /// Scoped to every managed school in the listed regions.
    Region,
    /// Unscoped.
    AllSchools,
    /// A stored value this build does not know. Always fails closed.
    Unrecognized(i32),
}

impl PermissionLevel {
    /// Maps the stored integer (1-3) to a level.
    #[must_use]
    pub fn from_storage(value: i32) -> Self {
        match value {
            1 => Self::SingleSchool,
            2 => Self::Region,
            3 => Self::AllSchools,
            other => Self::Unrecognized(other),
        }
    }
}

/// Role assigned to a permission record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// School-level teacher.
    Teacher,
    /// Manages visits and mentorship for a program.
    ProgramManager,
    /// Oversees program managers.
    ProgramAdmin,
    /// Unrestricted administrator.
    Admin,
}

impl Role {
    /// Returns a stable storage value for this role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Teacher => "teacher",
            Self::ProgramManager => "program_manager",
            Self::ProgramAdmin => "program_admin",
            Self::Admin => "admin",
        }
    }

    /// Returns all known roles.
    #[must_use]
    pub fn all() -> &'static [Self] {
        const ALL: &[Role] = &[
            Role::Teacher,
            Role::ProgramManager,
            Role::ProgramAdmin,
            Role::Admin,
        ];

        ALL
    }

    /// Parses a stored role value.
    ///
    /// Only the exact storage spelling is recognized; anything else, including
    /// a differently cased or padded value, falls back to `Teacher`.
    #[must_use]
    pub fn from_storage(value: Option<&str>) -> Self {
        let Some(value) = value else {
            return Self::Teacher;
        };

        Self::all()
            .iter()
            .copied()
            .find(|role| role.as_str() == value)
            .unwrap_or(Self::Teacher)
    }
}

/// Stored permission record for one identity.
///
/// Rows are administered outside this system and are only ever read here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPermission {
    email: String,
    level: PermissionLevel,
    role: Role,
    school_codes: BTreeSet<String>,
    regions: BTreeSet<String>,
    programs: ProgramMembership,
    read_only: bool,
}

impl UserPermission {
    /// Creates a permission record with no schools, regions or programs.
    #[must_use]
    pub fn new(email: impl Into<String>, level: PermissionLevel, role: Role) -> Self {
        Self {
            email: email.into(),
            level,
            role,
            school_codes: BTreeSet::new(),
            regions: BTreeSet::new(),
            programs: ProgramMembership::Unset,
            read_only: false,
        }
    }

    /// Replaces the school codes.
    #[must_use]
    pub fn with_school_codes<I, S>(mut self, school_codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.school_codes = school_codes.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the regions.
    #[must_use]
    pub fn with_regions<I, S>(mut self, regions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.regions = regions.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the program membership.
    #[must_use]
    pub fn with_programs(mut self, programs: ProgramMembership) -> Self {
        self.programs = programs;
        self
    }

    /// Sets the read-only modifier.
    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Returns the email key as stored.
    #[must_use]
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Returns the geographic level.
    #[must_use]
    pub fn level(&self) -> PermissionLevel {
        self.level
    }

    /// Returns the role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the school codes (meaningful for `SingleSchool`).
    #[must_use]
    pub fn school_codes(&self) -> &BTreeSet<String> {
        &self.school_codes
    }

    /// Returns the regions (meaningful for `Region`).
    #[must_use]
    pub fn regions(&self) -> &BTreeSet<String> {
        &self.regions
    }

    /// Returns the program membership.
    #[must_use]
    pub fn programs(&self) -> &ProgramMembership {
        &self.programs
    }

    /// Returns whether edit verdicts are downgraded to view.
    #[must_use]
    pub fn read_only(&self) -> bool {
        self.read_only
    }

    /// Returns whether this record belongs to an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
