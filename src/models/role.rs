use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Account role. Stored and serialized as its exact variant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub enum Role {
    Admin,
    Manager,
    Doctor,
    Staff,
    Patient,
}

/// Classes of doctor operations a role may be allowed to perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ViewDoctors,
    ManageDoctors,
    DeleteDoctors,
}

impl Capability {
    pub fn describe(self) -> &'static str {
        match self {
            Capability::ViewDoctors => "view doctors",
            Capability::ManageDoctors => "create or update doctors",
            Capability::DeleteDoctors => "delete doctors",
        }
    }
}

impl Role {
    pub const ALL: [Role; 5] = [
        Role::Admin,
        Role::Manager,
        Role::Doctor,
        Role::Staff,
        Role::Patient,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Manager => "Manager",
            Role::Doctor => "Doctor",
            Role::Staff => "Staff",
            Role::Patient => "Patient",
        }
    }

    pub fn can(self, capability: Capability) -> bool {
        match capability {
            Capability::ViewDoctors => true,
            Capability::ManageDoctors => matches!(self, Role::Admin | Role::Manager),
            Capability::DeleteDoctors => self == Role::Admin,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == value)
            .ok_or_else(|| format!("Unknown role: {}", value))
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}
