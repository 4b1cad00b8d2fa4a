use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for registered users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub u64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employer,
    Applicant,
    Superuser,
}

/// Role set held on the identity record. Roles are not mutually exclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Roles(BTreeSet<Role>);

impl Roles {
    pub fn from_flags(is_employer: bool, is_applicant: bool, is_superuser: bool) -> Self {
        let mut roles = Self::default();
        roles.set(Role::Employer, is_employer);
        roles.set(Role::Applicant, is_applicant);
        roles.set(Role::Superuser, is_superuser);
        roles
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn set(&mut self, role: Role, enabled: bool) {
        if enabled {
            self.0.insert(role);
        } else {
            self.0.remove(&role);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

/// PHC-encoded hash produced by a [`super::PasswordHasher`].
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash {
    pub encoded: String,
}

impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PasswordHash(<redacted>)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub email: String,
    pub full_name: Option<String>,
    pub roles: Roles,
    pub password_hash: PasswordHash,
    pub date_joined: DateTime<Utc>,
}

impl User {
    pub fn is_employer(&self) -> bool {
        self.roles.contains(Role::Employer)
    }

    pub fn is_applicant(&self) -> bool {
        self.roles.contains(Role::Applicant)
    }

    pub fn is_superuser(&self) -> bool {
        self.roles.contains(Role::Superuser)
    }

    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            full_name: self.full_name.clone().unwrap_or_default(),
            is_employer: self.is_employer(),
            is_applicant: self.is_applicant(),
            is_superuser: self.is_superuser(),
            date_joined: self.date_joined,
        }
    }
}

/// User awaiting an identifier from the directory.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub full_name: Option<String>,
    pub roles: Roles,
    pub password_hash: PasswordHash,
    pub date_joined: DateTime<Utc>,
}

impl NewUser {
    pub fn with_id(self, id: UserId) -> User {
        User {
            id,
            email: self.email,
            full_name: self.full_name,
            roles: self.roles,
            password_hash: self.password_hash,
            date_joined: self.date_joined,
        }
    }
}

/// Identity initiating a request.
#[derive(Debug, Clone, Default)]
pub enum Actor {
    #[default]
    Anonymous,
    User(User),
}

impl Actor {
    pub fn user(&self) -> Option<&User> {
        match self {
            Actor::Anonymous => None,
            Actor::User(user) => Some(user),
        }
    }

    pub fn id(&self) -> Option<UserId> {
        self.user().map(|user| user.id)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::User(_))
    }

    pub fn is_superuser(&self) -> bool {
        self.user().is_some_and(User::is_superuser)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Registration {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_employer: bool,
    #[serde(default)]
    pub is_applicant: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Partial role change; absent flags are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RoleUpdate {
    #[serde(default)]
    pub is_employer: Option<bool>,
    #[serde(default)]
    pub is_applicant: Option<bool>,
    #[serde(default)]
    pub is_superuser: Option<bool>,
}

impl RoleUpdate {
    pub fn apply(&self, roles: &mut Roles) {
        if let Some(flag) = self.is_employer {
            roles.set(Role::Employer, flag);
        }
        if let Some(flag) = self.is_applicant {
            roles.set(Role::Applicant, flag);
        }
        if let Some(flag) = self.is_superuser {
            roles.set(Role::Superuser, flag);
        }
    }
}

/// Public representation of a user; never carries credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub id: UserId,
    pub email: String,
    pub full_name: String,
    pub is_employer: bool,
    pub is_applicant: bool,
    pub is_superuser: bool,
    pub date_joined: DateTime<Utc>,
}
