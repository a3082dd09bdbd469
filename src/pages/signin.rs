use crate::config::Timing;
use crate::error::{Result, ScrapeError};
use crate::pages::{Loadable, all_present, wait_until};
use crate::session::{BrowserSession, Locator};
use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};
use totp_rs::{Algorithm, Secret, TOTP};

static EMAIL_INPUT: LazyLock<Locator> = LazyLock::new(|| Locator::id("ap_email"));
static CONTINUE_BUTTON: LazyLock<Locator> = LazyLock::new(|| Locator::id("continue"));
static PASSWORD_INPUT: LazyLock<Locator> = LazyLock::new(|| Locator::id("ap_password"));
static SIGN_IN_BUTTON: LazyLock<Locator> = LazyLock::new(|| Locator::id("signInSubmit"));
static OTP_INPUT: LazyLock<Locator> = LazyLock::new(|| Locator::id("auth-mfa-otpcode"));
static OTP_SUBMIT_BUTTON: LazyLock<Locator> = LazyLock::new(|| Locator::id("auth-signin-button"));

const TOTP_DIGITS: usize = 6;
const TOTP_STEP_SECS: u64 = 30;

/// First sign-in screen: asks for the account email
pub struct EmailPage<'a> {
    session: &'a dyn BrowserSession,
    timing: Timing,
}

impl<'a> EmailPage<'a> {
    /// Navigate to the sign-in page
    pub async fn open(
        session: &'a dyn BrowserSession,
        sign_in_url: &str,
        timing: Timing,
    ) -> Result<Self> {
        session.goto(sign_in_url).await?;
        Ok(Self { session, timing })
    }

    /// Submit the email and move on to the password screen
    pub async fn username(self, email: &SecretString) -> Result<PasswordPage<'a>> {
        self.session.fill(&EMAIL_INPUT, email.expose_secret()).await?;
        self.session.click(&CONTINUE_BUTTON).await?;
        Ok(PasswordPage {
            session: self.session,
            timing: self.timing,
        })
    }
}

#[async_trait]
impl Loadable for EmailPage<'_> {
    fn name(&self) -> &str {
        "sign-in email page"
    }

    fn timing(&self) -> Timing {
        self.timing
    }

    async fn did_load(&self) -> bool {
        all_present(self.session, &[&*EMAIL_INPUT, &*CONTINUE_BUTTON]).await
    }
}

/// Second sign-in screen: asks for the password
pub struct PasswordPage<'a> {
    session: &'a dyn BrowserSession,
    timing: Timing,
}

impl<'a> PasswordPage<'a> {
    /// Submit the password; the store may follow up with a one-time code prompt
    pub async fn password(self, password: &SecretString) -> Result<OneTimeCodePage<'a>> {
        self.session
            .fill(&PASSWORD_INPUT, password.expose_secret())
            .await?;
        self.session.click(&SIGN_IN_BUTTON).await?;
        Ok(OneTimeCodePage {
            session: self.session,
            timing: self.timing,
        })
    }
}

#[async_trait]
impl Loadable for PasswordPage<'_> {
    fn name(&self) -> &str {
        "sign-in password page"
    }

    fn timing(&self) -> Timing {
        self.timing
    }

    async fn did_load(&self) -> bool {
        all_present(self.session, &[&*PASSWORD_INPUT, &*SIGN_IN_BUTTON]).await
    }
}

/// Optional two-factor screen
pub struct OneTimeCodePage<'a> {
    session: &'a dyn BrowserSession,
    timing: Timing,
}

impl OneTimeCodePage<'_> {
    /// Enter the current code for `secret` and wait for the browser to leave the page
    pub async fn otp(self, secret: &SecretString) -> Result<()> {
        let code = totp_code(secret.expose_secret(), unix_now()?)?;

        let old_url = self.session.current_url().await?;
        self.session.fill(&OTP_INPUT, &code).await?;
        self.session.click(&OTP_SUBMIT_BUTTON).await?;

        let session = self.session;
        let old_url = old_url.as_str();
        wait_until(
            "one-time code submission",
            self.timing.load_timeout,
            self.timing.poll_interval,
            || async move { matches!(session.current_url().await, Ok(url) if url != old_url) },
        )
        .await
    }
}

#[async_trait]
impl Loadable for OneTimeCodePage<'_> {
    fn name(&self) -> &str {
        "one-time code page"
    }

    fn timing(&self) -> Timing {
        self.timing
    }

    async fn did_load(&self) -> bool {
        all_present(self.session, &[&*OTP_INPUT, &*OTP_SUBMIT_BUTTON]).await
    }
}

/// RFC 6238 code (SHA-1, 6 digits, 30 s step) for a base32 `secret` at `unix_time`
pub fn totp_code(secret: &str, unix_time: u64) -> Result<String> {
    let normalized: String = secret
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '=')
        .collect::<String>()
        .to_uppercase();
    if normalized.is_empty() {
        return Err(ScrapeError::InvalidSecret("secret is empty".to_string()));
    }

    let bytes = Secret::Encoded(normalized)
        .to_bytes()
        .map_err(|e| ScrapeError::InvalidSecret(format!("{e:?}")))?;
    let totp = TOTP::new_unchecked(Algorithm::SHA1, TOTP_DIGITS, 1, TOTP_STEP_SECS, bytes);
    Ok(totp.generate(unix_time))
}

fn unix_now() -> Result<u64> {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|e| ScrapeError::InvalidSecret(format!("system clock before epoch: {e}")))
}
