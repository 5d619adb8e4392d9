//! `stockroom-auth`: pure role-based access boundary for the console.
//!
//! This crate is intentionally decoupled from HTTP, storage and routing: it
//! answers "who is this" and "may this role do X", nothing else.

pub mod authorize;
pub mod credentials;
pub mod identity;
pub mod permissions;
pub mod roles;

pub use authorize::{
    AccessExplanation, DenialKind, PermissionDefinition, RoleDefinition, can_access, can_access_as,
    describe_role, explain_access, registry,
};
pub use credentials::{CredentialError, StoredCredentials};
pub use identity::{Identity, IdentityError, Profile, UserRecord};
pub use permissions::PermissionTable;
pub use roles::{Role, UnknownRole};
