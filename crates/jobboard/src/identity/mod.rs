//! Users, role flags and credential checks.

pub mod directory;
pub mod domain;
pub mod password;
pub mod router;
pub mod service;


pub use directory::UserDirectory;
pub use domain::{
    Actor, Credentials, NewUser, PasswordHash, Registration, Role, RoleUpdate, Roles, User,
    UserId, UserProfile,
};
pub use password::{Argon2Hasher, PasswordError, PasswordHasher};
pub use router::identity_router;
pub use service::{normalize_email, IdentityError, IdentityService};
