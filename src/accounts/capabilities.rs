//! Capabilities a [`User`] carries: logging in and holding permissions.

use crate::accounts::{errors::AccountResult, password, repo_types::User};

/// An account that can prove its identity with a password.
pub trait Authenticatable {
    /// Identifier used to log in.
    fn username(&self) -> &str;
    fn password_hash(&self) -> &str;
    fn is_active(&self) -> bool;

    fn has_usable_password(&self) -> bool {
        password::is_password_usable(self.password_hash())
    }

    fn check_password(&self, raw: &str) -> AccountResult<bool> {
        password::verify_password(raw, self.password_hash())
    }
}

/// An account that may be granted privileges.
pub trait PermissionBearing: Authenticatable {
    fn is_staff(&self) -> bool;
    fn is_superuser(&self) -> bool;

    /// Active superusers hold every permission. Explicit grants are not
    /// modeled, so nobody else holds any.
    fn has_perm(&self, _perm: &str) -> bool {
        self.is_active() && self.is_superuser()
    }

    fn has_perms<'a, I>(&self, perms: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        perms.into_iter().all(|p| self.has_perm(p))
    }

    fn can_access_admin(&self) -> bool {
        self.is_active() && self.is_staff()
    }
}

impl Authenticatable for User {
    fn username(&self) -> &str {
        &self.email
    }

    fn password_hash(&self) -> &str {
        &self.password
    }

    fn is_active(&self) -> bool {
        self.is_active
    }
}

impl PermissionBearing for User {
    fn is_staff(&self) -> bool {
        self.is_staff
    }

    fn is_superuser(&self) -> bool {
        self.is_superuser
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::repo_types::Role;

    fn user(is_active: bool, is_staff: bool, is_superuser: bool) -> User {
        User {
            id: 1,
            first_name: String::new(),
            last_name: String::new(),
            email: "root@clinic.test".into(),
            password: password::hash_password("s3cret-pass").unwrap(),
            role: Role::Admin,
            profile_picture: None,
            bio: None,
            is_active,
            is_staff,
            is_superuser,
            last_login: None,
        }
    }

    #[test]
    fn active_superuser_holds_every_permission() {
        let u = user(true, true, true);
        assert!(u.has_perm("records.view_chart"));
        assert!(u.has_perms(["records.view_chart", "records.delete_chart"]));
        assert!(u.can_access_admin());
    }

    #[test]
    fn inactive_superuser_holds_nothing() {
        let u = user(false, true, true);
        assert!(!u.has_perm("records.view_chart"));
        assert!(!u.can_access_admin());
    }

    #[test]
    fn staff_without_superuser_has_no_implicit_permissions() {
        let u = user(true, true, false);
        assert!(!u.has_perm("records.view_chart"));
        assert!(u.can_access_admin());
    }

    #[test]
    fn check_password_uses_stored_hash() {
        let u = user(true, false, false);
        assert_eq!(u.username(), "root@clinic.test");
        assert!(u.has_usable_password());
        assert!(u.check_password("s3cret-pass").unwrap());
        assert!(!u.check_password("nope").unwrap());
    }
}
