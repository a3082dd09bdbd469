use crate::error::ScrapeError;
use secrecy::SecretString;

pub const EMAIL_ENV: &str = "AP_EMAIL";
pub const PASSWORD_ENV: &str = "AP_PASSWORD";
pub const TOTP_ENV: &str = "AP_TOTP";

/// Account secrets used to sign in
#[derive(Debug)]
pub struct Credentials {
    pub email: SecretString,
    pub password: SecretString,

    /// Shared secret for one-time codes; only needed if the account asks for one
    pub totp_secret: Option<SecretString>,
}

impl Credentials {
    /// Take each secret from the explicit value, falling back to its environment variable
    pub fn resolve(
        email: Option<String>,
        password: Option<String>,
        totp_secret: Option<String>,
    ) -> Result<Self, ScrapeError> {
        Self::resolve_with(email, password, totp_secret, |name| std::env::var(name).ok())
    }

    /// Same as [`Credentials::resolve`] with a custom variable lookup
    pub fn resolve_with(
        email: Option<String>,
        password: Option<String>,
        totp_secret: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ScrapeError> {
        let pick = |explicit: Option<String>, var: &str| {
            explicit
                .filter(|v| !v.is_empty())
                .or_else(|| lookup(var).filter(|v| !v.is_empty()))
        };

        let email = pick(email, EMAIL_ENV).ok_or(ScrapeError::MissingCredential(EMAIL_ENV))?;
        let password =
            pick(password, PASSWORD_ENV).ok_or(ScrapeError::MissingCredential(PASSWORD_ENV))?;
        let totp_secret = pick(totp_secret, TOTP_ENV);

        Ok(Self {
            email: SecretString::from(email),
            password: SecretString::from(password),
            totp_secret: totp_secret.map(SecretString::from),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_explicit_values_win() {
        let creds = Credentials::resolve_with(
            Some("cli@example.com".into()),
            Some("cli-pass".into()),
            None,
            env(&[(EMAIL_ENV, "env@example.com"), (TOTP_ENV, "JBSWY3DPEHPK3PXP")]),
        )
        .unwrap();
        assert_eq!(creds.email.expose_secret(), "cli@example.com");
        assert_eq!(creds.password.expose_secret(), "cli-pass");
        assert_eq!(
            creds.totp_secret.as_ref().map(|s| s.expose_secret()),
            Some("JBSWY3DPEHPK3PXP")
        );
    }

    #[test]
    fn test_empty_flag_falls_back_to_environment() {
        let creds = Credentials::resolve_with(
            Some(String::new()),
            None,
            None,
            env(&[(EMAIL_ENV, "env@example.com"), (PASSWORD_ENV, "env-pass")]),
        )
        .unwrap();
        assert_eq!(creds.email.expose_secret(), "env@example.com");
        assert!(creds.totp_secret.is_none());
    }

    #[test]
    fn test_missing_password_is_an_error() {
        let err = Credentials::resolve_with(
            Some("a@example.com".into()),
            None,
            None,
            env(&[]),
        )
        .unwrap_err();
        assert!(matches!(err, ScrapeError::MissingCredential(PASSWORD_ENV)));
    }
}
