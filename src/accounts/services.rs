use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::accounts::{
    capabilities::Authenticatable,
    dto::UserFields,
    errors::{AccountError, AccountResult},
    password::{hash_password, make_unusable_password, verify_password},
    repo::UserStore,
    repo_types::{NewUser, Role, User},
};

const MAX_EMAIL_LEN: usize = 254;
const MAX_NAME_LEN: usize = 255;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// Trims the address and lower-cases its domain. The local part is kept as
/// given; input without an `@` is only trimmed.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

async fn encode_password(password: Option<&str>) -> AccountResult<String> {
    let Some(plain) = password else {
        return Ok(make_unusable_password());
    };
    let plain = plain.to_owned();
    tokio::task::spawn_blocking(move || hash_password(&plain))
        .await
        .map_err(|e| {
            error!(error = %e, "hashing task failed");
            AccountError::Hashing(e.to_string())
        })?
}

async fn check_password_blocking(user: &User, plain: &str) -> AccountResult<bool> {
    let stored = user.password_hash().to_owned();
    let plain = plain.to_owned();
    tokio::task::spawn_blocking(move || verify_password(&plain, &stored))
        .await
        .map_err(|e| AccountError::Hashing(e.to_string()))?
}

fn check_name(field: &str, value: &str) -> AccountResult<()> {
    if value.chars().count() > MAX_NAME_LEN {
        return Err(AccountError::Validation(format!(
            "{field} must be at most {MAX_NAME_LEN} characters"
        )));
    }
    Ok(())
}

/// Creates, looks up and authenticates accounts held in a [`UserStore`].
pub struct UserManager<S> {
    store: Arc<S>,
}

impl<S> Clone for UserManager<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: UserStore> UserManager<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a regular account.
    ///
    /// The email is trimmed and its domain lower-cased before use. Without a
    /// password the account gets an unusable credential and cannot log in
    /// until [`UserManager::set_password`] is called.
    #[instrument(skip(self, password, fields))]
    pub async fn create_user(
        &self,
        email: &str,
        password: Option<&str>,
        fields: UserFields,
    ) -> AccountResult<User> {
        let email = normalize_email(email);
        if email.is_empty() {
            warn!("create_user without email");
            return Err(AccountError::Validation("email required".into()));
        }
        if email.chars().count() > MAX_EMAIL_LEN || !is_valid_email(&email) {
            warn!(email = %email, "invalid email");
            return Err(AccountError::Validation("invalid email".into()));
        }
        let Some(role) = fields.role else {
            warn!(email = %email, "create_user without role");
            return Err(AccountError::Validation("role required".into()));
        };
        let first_name = fields.first_name.unwrap_or_default();
        let last_name = fields.last_name.unwrap_or_default();
        check_name("first_name", &first_name)?;
        check_name("last_name", &last_name)?;

        let password = encode_password(password).await?;

        let user = self
            .store
            .insert(NewUser {
                first_name,
                last_name,
                email,
                password,
                role,
                profile_picture: fields.profile_picture,
                bio: fields.bio,
                is_active: fields.is_active.unwrap_or(true),
                is_staff: fields.is_staff.unwrap_or(false),
                is_superuser: fields.is_superuser.unwrap_or(false),
            })
            .await
            .map_err(|e| {
                if let AccountError::EmailTaken(email) = &e {
                    warn!(email = %email, "email already registered");
                }
                e
            })?;

        info!(user_id = user.id, email = %user.email, role = %user.role, "user created");
        Ok(user)
    }

    /// Creates an administrative account. `is_staff`, `is_superuser` and
    /// `role` default to `true`, `true` and `admin` unless set in `fields`.
    ///
    /// Overrides are not reconciled: a superuser without staff access or with
    /// a non-admin role is created as asked, with a warning.
    #[instrument(skip(self, password, fields))]
    pub async fn create_superuser(
        &self,
        email: &str,
        password: Option<&str>,
        fields: UserFields,
    ) -> AccountResult<User> {
        let fields = fields.or(UserFields {
            role: Some(Role::Admin),
            is_staff: Some(true),
            is_superuser: Some(true),
            ..UserFields::default()
        });

        if fields.is_superuser == Some(true)
            && (fields.is_staff != Some(true) || fields.role != Some(Role::Admin))
        {
            warn!(
                email = %email.trim(),
                is_staff = ?fields.is_staff,
                role = ?fields.role,
                "superuser created without staff access or admin role"
            );
        }

        self.create_user(email, password, fields).await
    }

    pub async fn get(&self, id: i64) -> AccountResult<Option<User>> {
        self.store.find_by_id(id).await
    }

    pub async fn get_by_email(&self, email: &str) -> AccountResult<Option<User>> {
        self.store.find_by_email(&normalize_email(email)).await
    }

    /// Returns the account when `email` names an active account whose
    /// password matches, and stamps its `last_login`.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> AccountResult<Option<User>> {
        let email = normalize_email(email);
        let Some(mut user) = self.store.find_by_email(&email).await? else {
            // Hash anyway so unknown emails take as long as wrong passwords.
            encode_password(Some(password)).await?;
            warn!(email = %email, "login unknown email");
            return Ok(None);
        };

        if !check_password_blocking(&user, password).await? {
            warn!(user_id = user.id, "login invalid password");
            return Ok(None);
        }
        if !user.is_active {
            warn!(user_id = user.id, "login inactive account");
            return Ok(None);
        }

        let now = OffsetDateTime::now_utc();
        self.store.touch_last_login(user.id, now).await?;
        user.last_login = Some(now);
        info!(user_id = user.id, "user authenticated");
        Ok(Some(user))
    }

    /// Replaces the stored credential. `None` leaves the account unusable
    /// for password login.
    #[instrument(skip(self, password))]
    pub async fn set_password(&self, id: i64, password: Option<&str>) -> AccountResult<()> {
        let encoded = encode_password(password).await?;
        if !self.store.update_password(id, &encoded).await? {
            return Err(AccountError::NotFound);
        }
        info!(user_id = id, usable = password.is_some(), "password changed");
        Ok(())
    }
}
