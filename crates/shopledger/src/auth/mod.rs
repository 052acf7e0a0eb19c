//! Accounts, roles and bearer tokens.

pub mod domain;
mod password;
mod service;
mod token;

pub use domain::{Credentials, NewUser, Permission, Role, Session, User, UserUpdate};
pub use password::{hash_password, verify_password, MIN_PASSWORD_LEN};
pub use service::AuthService;
pub use token::{TokenClaims, TokenError, TokenSigner};
