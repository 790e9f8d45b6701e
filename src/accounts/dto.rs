use serde::Deserialize;

use crate::accounts::repo_types::Role;

/// Optional profile and privilege fields supplied when creating an account.
///
/// Unset fields are resolved in this order: the value given here, then the
/// factory's own default (see `UserManager::create_superuser`), then the
/// global default (empty names, no picture or bio, active, not staff, not
/// superuser). `role` has no global default and must be resolved somewhere.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserFields {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub role: Option<Role>,
    pub profile_picture: Option<String>,
    pub bio: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: Option<bool>,
    pub is_superuser: Option<bool>,
}

impl UserFields {
    pub fn with_role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    /// Fills every unset field from `defaults`; fields already set win.
    pub fn or(self, defaults: UserFields) -> Self {
        Self {
            first_name: self.first_name.or(defaults.first_name),
            last_name: self.last_name.or(defaults.last_name),
            role: self.role.or(defaults.role),
            profile_picture: self.profile_picture.or(defaults.profile_picture),
            bio: self.bio.or(defaults.bio),
            is_active: self.is_active.or(defaults.is_active),
            is_staff: self.is_staff.or(defaults.is_staff),
            is_superuser: self.is_superuser.or(defaults.is_superuser),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_fields_win_over_defaults() {
        let explicit = UserFields {
            role: Some(Role::Doctor),
            is_staff: Some(false),
            ..UserFields::default()
        };
        let defaults = UserFields {
            role: Some(Role::Admin),
            is_staff: Some(true),
            is_superuser: Some(true),
            ..UserFields::default()
        };
        let merged = explicit.or(defaults);
        assert_eq!(merged.role, Some(Role::Doctor));
        assert_eq!(merged.is_staff, Some(false));
        assert_eq!(merged.is_superuser, Some(true));
        assert_eq!(merged.first_name, None);
    }

    #[test]
    fn deserializes_partial_json() {
        let fields: UserFields =
            serde_json::from_str(r#"{"role":"patient","bio":"allergic to penicillin"}"#).unwrap();
        assert_eq!(fields.role, Some(Role::Patient));
        assert_eq!(fields.bio.as_deref(), Some("allergic to penicillin"));
        assert!(fields.is_staff.is_none());
    }
}
