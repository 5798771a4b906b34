//! Boundary input validation.
//!
//! Explicit validation functions returning typed field errors, invoked at
//! the HTTP boundary before calling into the lifecycle. Each check yields at
//! most one error per field; callers collect them with [`collect`].

use crate::role::Role;

/// A single rejected field with a human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    pub fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

/// Fold per-field checks into a single pass/fail result.
pub fn collect(checks: Vec<Result<(), FieldError>>) -> Result<(), Vec<FieldError>> {
    let errors: Vec<FieldError> = checks.into_iter().filter_map(|c| c.err()).collect();
    if errors.is_empty() { Ok(()) } else { Err(errors) }
}

/// Minimal structural email check: one `@` with non-empty local and domain
/// parts. Deliverability is the notifier's problem, not ours.
pub fn email(field: &'static str, value: &str) -> Result<(), FieldError> {
    let mut parts = value.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");
    if local.is_empty() || domain.is_empty() || domain.contains('@') || value.contains(char::is_whitespace) {
        return Err(FieldError::new(field, "must be a valid email address"));
    }
    Ok(())
}

/// Password policy: 8–16 characters with at least one uppercase letter, one
/// lowercase letter, and one digit or symbol.
pub fn password(field: &'static str, value: &str) -> Result<(), FieldError> {
    let len = value.chars().count();
    if !(8..=16).contains(&len) {
        return Err(FieldError::new(field, "must be between 8 and 16 characters"));
    }
    let has_upper = value.chars().any(|c| c.is_uppercase());
    let has_lower = value.chars().any(|c| c.is_lowercase());
    let has_digit_or_symbol = value.chars().any(|c| !c.is_alphabetic());
    if !(has_upper && has_lower && has_digit_or_symbol) {
        return Err(FieldError::new(
            field,
            "must have an uppercase letter, a lowercase letter and a number",
        ));
    }
    Ok(())
}

pub fn non_empty(field: &'static str, value: &str) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::new(field, "must not be empty"));
    }
    Ok(())
}

/// Roles assigned through the user CRUD surface: non-empty and drawn from the
/// assignable set only (admin roles cannot be granted this way).
pub fn assignable_roles(field: &'static str, roles: &[Role]) -> Result<(), FieldError> {
    if roles.is_empty() {
        return Err(FieldError::new(field, "at least one role is required"));
    }
    if let Some(unknown) = roles.iter().find(|r| !Role::assignable().contains(r)) {
        return Err(FieldError::new(
            field,
            format!("role '{unknown}' is not assignable"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn email_requires_local_and_domain() {
        assert!(email("email", "a@x.com").is_ok());
        assert!(email("email", "@x.com").is_err());
        assert!(email("email", "a@").is_err());
        assert!(email("email", "ax.com").is_err());
        assert!(email("email", "a b@x.com").is_err());
    }

    #[test]
    fn password_policy_boundaries() {
        assert!(password("password", "Admin123").is_ok());
        assert!(password("password", "Admin12").is_err()); // 7 chars
        assert!(password("password", "Admin1234Admin123").is_err()); // 17 chars
        assert!(password("password", "admin1234").is_err()); // no uppercase
        assert!(password("password", "ADMIN1234").is_err()); // no lowercase
        assert!(password("password", "Adminxyzw").is_err()); // no digit/symbol
        assert!(password("password", "Admin!abc").is_ok()); // symbol counts
    }

    #[test]
    fn collect_gathers_all_failures() {
        let result = collect(vec![
            non_empty("firstName", ""),
            non_empty("lastName", "Lovelace"),
            email("email", "nope"),
        ]);
        let errors = result.unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "firstName");
        assert_eq!(errors[1].field, "email");
    }

    #[test]
    fn assignable_roles_rejects_admin_grants() {
        assert!(assignable_roles("roles", &[Role::MEMBER]).is_ok());
        assert!(assignable_roles("roles", &[]).is_err());
        assert!(assignable_roles("roles", &[Role::CONTENT_ADMIN]).is_err());
    }

    proptest! {
        // The policy must agree with its own definition for arbitrary
        // alphanumeric candidates.
        #[test]
        fn password_policy_is_consistent(candidate in "[A-Za-z0-9]{0,20}") {
            let len = candidate.chars().count();
            let expected = (8..=16).contains(&len)
                && candidate.chars().any(|c| c.is_uppercase())
                && candidate.chars().any(|c| c.is_lowercase())
                && candidate.chars().any(|c| !c.is_alphabetic());
            prop_assert_eq!(password("password", &candidate).is_ok(), expected);
        }
    }
}
