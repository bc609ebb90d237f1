use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use crate::error::AppError;

/// Capability tag a worker must hold to see or act on a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffRole {
    Housekeeper,
    Inspector,
    Maintenance,
}

impl StaffRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffRole::Housekeeper => "housekeeper",
            StaffRole::Inspector => "inspector",
            StaffRole::Maintenance => "maintenance",
        }
    }
}

impl fmt::Display for StaffRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StaffRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "housekeeper" => Ok(StaffRole::Housekeeper),
            "inspector" => Ok(StaffRole::Inspector),
            "maintenance" => Ok(StaffRole::Maintenance),
            other => Err(AppError::Validation(format!("Unknown staff role: {}", other))),
        }
    }
}

impl TryFrom<String> for StaffRole {
    type Error = AppError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Who is calling the engine. Admins and the booking system are unrestricted,
/// staff are confined to their role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Admin,
    System,
    Staff(StaffRole),
}

impl ActorRole {
    pub fn is_privileged(&self) -> bool {
        matches!(self, ActorRole::Admin | ActorRole::System)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Admin => "admin",
            ActorRole::System => "system",
            ActorRole::Staff(role) => role.as_str(),
        }
    }
}

impl FromStr for ActorRole {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(ActorRole::Admin),
            "system" => Ok(ActorRole::System),
            other => other.parse().map(ActorRole::Staff),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: String,
    pub role: ActorRole,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: ActorRole) -> Self {
        Self { id: id.into(), role }
    }

    pub fn system() -> Self {
        Self::new("booking-lifecycle", ActorRole::System)
    }
}
