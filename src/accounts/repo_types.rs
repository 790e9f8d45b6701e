use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::accounts::errors::AccountError;

/// Role a clinic account acts under.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Doctor,
    Patient,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Doctor => "doctor",
            Role::Patient => "patient",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "doctor" => Ok(Role::Doctor),
            "patient" => Ok(Role::Patient),
            "admin" => Ok(Role::Admin),
            other => Err(AccountError::Validation(format!("unknown role `{other}`"))),
        }
    }
}

/// Persisted user account.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String, // PHC hash or unusable marker, never plaintext
    pub role: Role,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<OffsetDateTime>,
}

impl fmt::Display for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.email)
    }
}

/// Fully resolved record handed to a store for insertion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

impl NewUser {
    pub(crate) fn into_user(self, id: i64) -> User {
        User {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password: self.password,
            role: self.role,
            profile_picture: self.profile_picture,
            bio: self.bio,
            is_active: self.is_active,
            is_staff: self.is_staff,
            is_superuser: self.is_superuser,
            last_login: None,
        }
    }
}

/// Raw `users` row as returned by Postgres.
#[derive(Debug, FromRow)]
pub struct UserRow {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<OffsetDateTime>,
}

impl TryFrom<UserRow> for User {
    type Error = AccountError;

    fn try_from(r: UserRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            first_name: r.first_name,
            last_name: r.last_name,
            email: r.email,
            password: r.password,
            role: r.role.parse()?,
            profile_picture: r.profile_picture,
            bio: r.bio,
            is_active: r.is_active,
            is_staff: r.is_staff,
            is_superuser: r.is_superuser,
            last_login: r.last_login,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(role: &str) -> UserRow {
        UserRow {
            id: 7,
            first_name: "Ada".into(),
            last_name: String::new(),
            email: "ada@clinic.test".into(),
            password: "$argon2id$v=19$m=19456,t=2,p=1$c2FsdA$aGFzaA".into(),
            role: role.into(),
            profile_picture: None,
            bio: Some("cardiology".into()),
            is_active: true,
            is_staff: false,
            is_superuser: false,
            last_login: None,
        }
    }

    #[test]
    fn row_converts_into_user() {
        let user = User::try_from(row("doctor")).expect("valid row");
        assert_eq!(user.id, 7);
        assert_eq!(user.role, Role::Doctor);
        assert_eq!(user.to_string(), "ada@clinic.test");
    }

    #[test]
    fn row_with_unknown_role_is_rejected() {
        let err = User::try_from(row("nurse")).unwrap_err();
        assert!(matches!(err, AccountError::Validation(_)));
    }

    #[test]
    fn serialization_hides_password() {
        let user = User::try_from(row("patient")).unwrap();
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("\"role\":\"patient\""));
        assert!(!json.contains("argon2"));
        assert!(!json.contains("\"password\""));
    }
}
