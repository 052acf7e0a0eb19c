use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{info, warn};

use super::domain::{Credentials, NewUser, Role, Session, User, UserUpdate};
use super::password::{hash_password, verify_password};
use super::token::TokenSigner;
use crate::config::AuthConfig;
use crate::domain::UserId;
use crate::error::ServiceError;
use crate::store::Repository;

/// Account management, login and token verification.
pub struct AuthService {
    users: Arc<dyn Repository<User>>,
    signer: TokenSigner,
    /// Held from every uniqueness or admin-count check to the write it guards.
    accounts: Mutex<()>,
}

impl AuthService {
    pub fn new(users: Arc<dyn Repository<User>>, config: &AuthConfig) -> Self {
        Self {
            users,
            signer: TokenSigner::new(config.secret.clone(), config.token_ttl_minutes),
            accounts: Mutex::new(()),
        }
    }

    /// Open sign-up for the very first account, which becomes the administrator.
    pub fn register(&self, new_user: NewUser) -> Result<User, ServiceError> {
        if !self.users.list()?.is_empty() {
            return Err(ServiceError::Forbidden);
        }
        self.insert_user(new_user, Role::Admin, true)
    }

    /// Creates an account on behalf of an administrator.
    pub fn create_user(&self, new_user: NewUser) -> Result<User, ServiceError> {
        let role = new_user.role.unwrap_or(Role::Staff);
        self.insert_user(new_user, role, false)
    }

    /// Creates the configured administrator unless that username already exists.
    pub fn ensure_admin(&self, username: &str, password: &str) -> Result<User, ServiceError> {
        if let Some(existing) = self.find_by_username(username)? {
            return Ok(existing);
        }
        let user = self.insert_user(
            NewUser {
                username: username.to_string(),
                password: password.to_string(),
                email: None,
                display_name: None,
                role: Some(Role::Admin),
            },
            Role::Admin,
            false,
        )?;
        info!(username = %user.username, "bootstrap administrator created");
        Ok(user)
    }

    pub fn login(&self, credentials: Credentials) -> Result<Session, ServiceError> {
        self.login_at(credentials, Utc::now())
    }

    pub fn login_at(
        &self,
        credentials: Credentials,
        now: DateTime<Utc>,
    ) -> Result<Session, ServiceError> {
        let user = match self.find_by_username(&credentials.username)? {
            Some(user) if user.active && verify_password(&credentials.password, &user.password_hash) => {
                user
            }
            _ => {
                warn!(username = %credentials.username, "rejected login");
                return Err(ServiceError::Unauthorized);
            }
        };

        let (token, expires_at) = self.signer.issue(user.id, now);
        info!(user_id = %user.id, "user logged in");
        Ok(Session {
            token,
            expires_at,
            user,
        })
    }

    pub fn authenticate(&self, token: &str) -> Result<User, ServiceError> {
        self.authenticate_at(token, Utc::now())
    }

    pub fn authenticate_at(&self, token: &str, now: DateTime<Utc>) -> Result<User, ServiceError> {
        let claims = self.signer.verify(token, now).map_err(|err| {
            warn!(error = %err, "rejected bearer token");
            ServiceError::Unauthorized
        })?;
        match self.users.fetch(claims.user_id)? {
            Some(user) if user.active => Ok(user),
            _ => Err(ServiceError::Unauthorized),
        }
    }

    pub fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.users.list()?)
    }

    pub fn get_user(&self, id: UserId) -> Result<User, ServiceError> {
        self.users
            .fetch(id)?
            .ok_or_else(|| ServiceError::not_found("user", id))
    }

    pub fn update_user(&self, id: UserId, update: UserUpdate) -> Result<User, ServiceError> {
        let password_hash = update.password.as_deref().map(hash_password).transpose()?;

        let _accounts = self.accounts.lock();
        let mut user = self.get_user(id)?;

        if let Some(display_name) = update.display_name {
            user.display_name = required(display_name, "display_name")?;
        }
        if let Some(email) = update.email {
            user.email = normalize_email(Some(email))?;
        }
        if let Some(password_hash) = password_hash {
            user.password_hash = password_hash;
        }

        let demotes_admin = user.role == Role::Admin
            && (update.role.is_some_and(|role| role != Role::Admin) || update.active == Some(false));
        if demotes_admin && self.active_admin_count()? <= 1 {
            return Err(ServiceError::conflict(
                "at least one active administrator is required",
            ));
        }
        if let Some(role) = update.role {
            user.role = role;
        }
        if let Some(active) = update.active {
            user.active = active;
        }

        self.users.update(user.clone())?;
        info!(user_id = %user.id, role = user.role.label(), active = user.active, "user updated");
        Ok(user)
    }

    /// `first_only` refuses the insert unless the user table is still empty.
    fn insert_user(
        &self,
        new_user: NewUser,
        role: Role,
        first_only: bool,
    ) -> Result<User, ServiceError> {
        let username = required(new_user.username, "username")?;
        if username.chars().any(char::is_whitespace) {
            return Err(ServiceError::validation("username must not contain spaces"));
        }
        let display_name = match new_user.display_name {
            Some(name) => required(name, "display_name")?,
            None => username.clone(),
        };
        let email = normalize_email(new_user.email)?;
        let password_hash = hash_password(&new_user.password)?;

        let _accounts = self.accounts.lock();
        if first_only && !self.users.list()?.is_empty() {
            return Err(ServiceError::Forbidden);
        }
        if self.find_by_username(&username)?.is_some() {
            return Err(ServiceError::conflict(format!(
                "username '{username}' is taken"
            )));
        }

        let user = User {
            id: UserId(0),
            password_hash,
            email,
            username,
            display_name,
            role,
            active: true,
            created_at: Utc::now(),
        };
        let stored = self.users.insert(user)?;
        info!(user_id = %stored.id, role = stored.role.label(), "user created");
        Ok(stored)
    }

    fn find_by_username(&self, username: &str) -> Result<Option<User>, ServiceError> {
        let username = username.trim();
        Ok(self
            .users
            .list()?
            .into_iter()
            .find(|user| user.username.eq_ignore_ascii_case(username)))
    }

    fn active_admin_count(&self) -> Result<usize, ServiceError> {
        Ok(self
            .users
            .list()?
            .iter()
            .filter(|user| user.active && user.role == Role::Admin)
            .count())
    }
}

fn required(value: String, field: &str) -> Result<String, ServiceError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::validation(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

fn normalize_email(email: Option<String>) -> Result<Option<String>, ServiceError> {
    match email.map(|value| value.trim().to_string()) {
        Some(value) if value.is_empty() => Ok(None),
        Some(value) if !value.contains('@') => Err(ServiceError::validation(format!(
            "'{value}' is not an email address"
        ))),
        other => Ok(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryRepository;
    use chrono::Duration;

    fn service() -> AuthService {
        let config = AuthConfig {
            secret: b"0123456789abcdef0123456789abcdef".to_vec(),
            token_ttl_minutes: 30,
            bootstrap_admin: None,
        };
        AuthService::new(Arc::new(MemoryRepository::<User>::default()), &config)
    }

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            password: "counter-top-9".to_string(),
            email: None,
            display_name: None,
            role: None,
        }
    }

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn first_registration_becomes_admin_and_closes_signup() {
        let service = service();
        let admin = service.register(new_user("owner")).expect("first user registers");
        assert_eq!(admin.role, Role::Admin);

        assert!(matches!(
            service.register(new_user("intruder")),
            Err(ServiceError::Forbidden)
        ));
    }

    #[test]
    fn created_users_default_to_staff_and_names_are_unique() {
        let service = service();
        service.register(new_user("owner")).expect("registers");
        let clerk = service.create_user(new_user("clerk")).expect("creates clerk");
        assert_eq!(clerk.role, Role::Staff);

        assert!(matches!(
            service.create_user(new_user("CLERK")),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn login_issues_token_that_authenticates() {
        let service = service();
        let admin = service.register(new_user("owner")).expect("registers");
        let now = Utc::now();

        let session = service
            .login_at(credentials("Owner", "counter-top-9"), now)
            .expect("login succeeds");
        let user = service
            .authenticate_at(&session.token, now)
            .expect("token authenticates");
        assert_eq!(user.id, admin.id);

        assert!(matches!(
            service.authenticate_at(&session.token, now + Duration::minutes(31)),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn wrong_password_and_unknown_user_look_the_same() {
        let service = service();
        service.register(new_user("owner")).expect("registers");
        assert!(matches!(
            service.login(credentials("owner", "wrong-password")),
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            service.login(credentials("ghost", "counter-top-9")),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn deactivated_users_lose_access() {
        let service = service();
        service.register(new_user("owner")).expect("registers");
        let clerk = service.create_user(new_user("clerk")).expect("creates");
        let session = service
            .login(credentials("clerk", "counter-top-9"))
            .expect("login succeeds");

        service
            .update_user(
                clerk.id,
                UserUpdate {
                    active: Some(false),
                    ..UserUpdate::default()
                },
            )
            .expect("deactivates");

        assert!(matches!(
            service.authenticate(&session.token),
            Err(ServiceError::Unauthorized)
        ));
        assert!(matches!(
            service.login(credentials("clerk", "counter-top-9")),
            Err(ServiceError::Unauthorized)
        ));
    }

    #[test]
    fn last_admin_cannot_be_demoted() {
        let service = service();
        let admin = service.register(new_user("owner")).expect("registers");
        let result = service.update_user(
            admin.id,
            UserUpdate {
                role: Some(Role::Staff),
                ..UserUpdate::default()
            },
        );
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    fn race<T>(
        service: &AuthService,
        attempts: usize,
        work: impl Fn(&AuthService) -> Result<T, ServiceError> + Sync,
    ) -> usize {
        let barrier = std::sync::Barrier::new(attempts);
        let (barrier, work) = (&barrier, &work);
        std::thread::scope(|scope| {
            let mut handles = Vec::with_capacity(attempts);
            for _ in 0..attempts {
                handles.push(scope.spawn(move || {
                    barrier.wait();
                    work(service).is_ok()
                }));
            }
            handles
                .into_iter()
                .map(|handle| handle.join().expect("thread completes"))
                .filter(|created| *created)
                .count()
        })
    }

    #[test]
    fn concurrent_signups_yield_a_single_admin() {
        let service = service();
        let created = race(&service, 8, |service| service.register(new_user("owner")));
        assert_eq!(created, 1);

        let users = service.list_users().expect("lists");
        assert_eq!(users.len(), 1);
        assert_eq!(users[0].role, Role::Admin);
    }

    #[test]
    fn concurrent_creates_keep_usernames_unique() {
        let service = service();
        service.register(new_user("owner")).expect("registers");
        let created = race(&service, 8, |service| service.create_user(new_user("clerk")));
        assert_eq!(created, 1);
        assert_eq!(service.list_users().expect("lists").len(), 2);
    }

    #[test]
    fn ensure_admin_is_idempotent() {
        let service = service();
        let first = service
            .ensure_admin("root", "bootstrap-pass")
            .expect("creates admin");
        let second = service
            .ensure_admin("root", "bootstrap-pass")
            .expect("reuses admin");
        assert_eq!(first.id, second.id);
        assert_eq!(service.list_users().expect("lists").len(), 1);
    }
}
