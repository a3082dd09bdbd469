use super::fixtures::*;
use crate::config::SiteUrls;
use crate::error::ScrapeError;
use crate::flow::sign_in;
use crate::pages::{EmailPage, Loadable};
use crate::session::{BrowserSession, OfflineSession};

#[tokio::test]
async fn test_sign_in_with_one_time_code() {
    let session = sign_in_site(true);
    sign_in(&session, &credentials(Some(TOTP_SECRET)), &SiteUrls::default(), timing())
        .await
        .unwrap();

    assert_eq!(session.current_url().await.unwrap(), HOME_URL);

    let typed = session.typed();
    assert_eq!(typed[0], ("#ap_email".to_string(), "buyer@example.com".to_string()));
    assert_eq!(typed[1], ("#ap_password".to_string(), "hunter2".to_string()));
    let (field, code) = &typed[2];
    assert_eq!(field, "#auth-mfa-otpcode");
    assert_eq!(code.len(), 6);
    assert!(code.chars().all(|c| c.is_ascii_digit()));

    assert_eq!(
        session.clicks(),
        vec!["#continue", "#signInSubmit", "#auth-signin-button"]
    );
}

#[tokio::test]
async fn test_sign_in_without_code_prompt_skips_code_entry() {
    let session = sign_in_site(false);
    sign_in(&session, &credentials(Some(TOTP_SECRET)), &SiteUrls::default(), timing())
        .await
        .unwrap();

    assert_eq!(session.typed().len(), 2);
    assert!(!session.clicks().iter().any(|c| c == "#auth-signin-button"));
}

#[tokio::test]
async fn test_code_prompt_without_secret_fails() {
    let session = sign_in_site(true);
    let err = sign_in(&session, &credentials(None), &SiteUrls::default(), timing())
        .await
        .unwrap_err();
    assert!(matches!(err, ScrapeError::MissingCredential("AP_TOTP")));
}

#[tokio::test]
async fn test_missing_email_form_times_out() {
    let session = OfflineSession::new();
    let err = sign_in(&session, &credentials(None), &SiteUrls::default(), timing())
        .await
        .unwrap_err();
    match err {
        ScrapeError::PageLoadTimeout { page, .. } => assert_eq!(page, "sign-in email page"),
        other => panic!("unexpected error: {other}"),
    }
    // Nothing was typed into a page that never loaded
    assert!(session.typed().is_empty());
}

#[tokio::test]
async fn test_email_page_readiness() {
    let session = sign_in_site(false);
    let page = EmailPage::open(&session, SIGN_IN_URL, timing()).await.unwrap();
    assert!(page.did_load().await);

    session.goto(HOME_URL).await.unwrap();
    assert!(!page.did_load().await);
}

#[tokio::test]
async fn test_code_that_never_leaves_the_prompt_times_out() {
    let session = stuck_code_prompt_site();
    let err = sign_in(&session, &credentials(Some(TOTP_SECRET)), &SiteUrls::default(), timing())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ScrapeError::PageLoadTimeout { ref page, .. } if page == "one-time code submission"
    ));
    assert_eq!(session.clicks().last().unwrap(), "#auth-signin-button");
    assert_eq!(session.current_url().await.unwrap(), OTP_URL);
}

#[tokio::test]
async fn test_control_gone_after_load_is_element_not_found() {
    let session = sign_in_site(false);
    let page = EmailPage::open(&session, SIGN_IN_URL, timing()).await.unwrap();
    page.load(timing().load_timeout).await.unwrap();

    // The form disappears between the readiness check and typing
    session.goto(HOME_URL).await.unwrap();
    let err = page
        .username(&credentials(None).email)
        .await
        .err()
        .expect("email field is gone");

    assert!(matches!(err, ScrapeError::ElementNotFound(ref locator) if locator == "#ap_email"));
    assert!(session.typed().is_empty());
}
