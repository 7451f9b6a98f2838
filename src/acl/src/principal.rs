//! Principals that can hold grants in an access-control list

use crate::error::{AclError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The reserved anonymous/public principal.
///
/// Entries held by this principal represent intentional publication and are
/// never stripped by propagation-on-removal.
pub const ANONYMOUS: Principal = Principal::Anonymous;

/// An identity that can be granted permissions
///
/// Principals have a textual form of `kind:name`, e.g. `user:alice`,
/// `group:chemistry-lab` or `role:ROLE_PI`. The anonymous principal is written
/// as `anonymous`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "name", rename_all = "snake_case")]
pub enum Principal {
    /// An individual user
    User(String),
    /// A group of users
    Group(String),
    /// A role held within a group (e.g. PI, lab admin)
    Role(String),
    /// Unauthenticated public access
    Anonymous,
}

impl Principal {
    /// Create a user principal
    pub fn user(name: impl Into<String>) -> Self {
        Self::User(name.into())
    }

    /// Create a group principal
    pub fn group(name: impl Into<String>) -> Self {
        Self::Group(name.into())
    }

    /// Create a role principal
    pub fn role(name: impl Into<String>) -> Self {
        Self::Role(name.into())
    }

    /// Parse a principal from its `kind:name` form
    pub fn parse(s: &str) -> Result<Self> {
        if s == "anonymous" {
            return Ok(Self::Anonymous);
        }

        let (kind, name) = s
            .split_once(':')
            .ok_or_else(|| AclError::InvalidPrincipal(format!("missing kind prefix: '{}'", s)))?;

        if name.is_empty() {
            return Err(AclError::InvalidPrincipal(format!("empty name: '{}'", s)));
        }

        match kind {
            "user" => Ok(Self::user(name)),
            "group" => Ok(Self::group(name)),
            "role" => Ok(Self::role(name)),
            other => Err(AclError::InvalidPrincipal(format!(
                "unknown principal kind '{}'",
                other
            ))),
        }
    }

    /// Whether this is the reserved anonymous/public principal
    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    /// Role name, if this principal is a role
    pub fn role_name(&self) -> Option<&str> {
        match self {
            Self::Role(name) => Some(name),
            _ => None,
        }
    }
}

impl FromStr for Principal {
    type Err = AclError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(name) => write!(f, "user:{}", name),
            Self::Group(name) => write!(f, "group:{}", name),
            Self::Role(name) => write!(f, "role:{}", name),
            Self::Anonymous => write!(f, "anonymous"),
        }
    }
}
