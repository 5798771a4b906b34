//! Message composition for the transactional emails the backend sends.
//!
//! Kept as plain functions so the lifecycle stays transport-agnostic: each
//! returns `(subject, body)` for `Notifier::send`.

/// Confirmation email for a freshly created account.
///
/// `temporary_password` is present for admin-created users, whose initial
/// credential is generated server-side and transmitted exactly once.
pub fn confirmation(
    confirmation_url: &str,
    token: &str,
    name: &str,
    temporary_password: Option<&str>,
) -> (String, String) {
    let uri = format!("{confirmation_url}?token={token}");
    let subject = "Welcome! Confirm your email".to_string();
    let body = match temporary_password {
        Some(password) => format!(
            "Hi {name},\n\nConfirm your email by visiting {uri}\n\n\
             Your temporary password is: {password}\n\
             You will be asked to change it after your first login."
        ),
        None => format!("Hi {name},\n\nConfirm your email by visiting {uri}"),
    };
    (subject, body)
}

/// Sent after a successful email confirmation.
pub fn email_confirmed() -> (String, String) {
    (
        "Your email was confirmed".to_string(),
        "Your email was successfully confirmed. Now you can log in.".to_string(),
    )
}

/// Sent after a password change.
pub fn password_changed() -> (String, String) {
    (
        "Your password was changed recently".to_string(),
        "Your password was successfully changed. If you did not request this \
         email you can safely ignore it."
            .to_string(),
    )
}

/// Credential recovery: carries the one-time temporary password in cleartext.
pub fn password_recovery(temporary_password: &str) -> (String, String) {
    (
        "Recover your credentials".to_string(),
        format!(
            "Log in with your email and the following temporary password: \
             {temporary_password}. Then change it to a password of your choice."
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_links_carry_the_token() {
        let (_, body) = confirmation("https://app.example/confirm", "tok123", "Ada", None);
        assert!(body.contains("https://app.example/confirm?token=tok123"));
        assert!(!body.contains("temporary password"));
    }

    #[test]
    fn admin_created_users_receive_their_temporary_password() {
        let (_, body) =
            confirmation("https://app.example/confirm", "tok123", "Ada", Some("Xy12abcd"));
        assert!(body.contains("Xy12abcd"));
    }
}
