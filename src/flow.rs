use crate::collector::collect_order_ids;
use crate::config::{ScraperConfig, SiteUrls, Timing};
use crate::credentials::{Credentials, TOTP_ENV};
use crate::error::{Result, ScrapeError};
use crate::fetcher::{fetch_receipts, pending_orders};
use crate::filter::OrderLinkFilter;
use crate::pages::{EmailPage, Loadable};
use crate::receipts::ReceiptStore;
use crate::results::RunSummary;
use crate::session::BrowserSession;

/// Walk the email, password and (if prompted) one-time code screens.
///
/// A one-time code screen that never appears means the account does not use
/// two-factor authentication. Any other failure aborts; nothing is retried.
pub async fn sign_in(
    session: &dyn BrowserSession,
    credentials: &Credentials,
    site: &SiteUrls,
    timing: Timing,
) -> Result<()> {
    ::log::info!("Loading sign-in page");
    let email_page = EmailPage::open(session, &site.sign_in_url()?, timing).await?;
    email_page.load(timing.load_timeout).await?;

    ::log::info!("Setting email");
    let password_page = email_page.username(&credentials.email).await?;
    password_page.load(timing.load_timeout).await?;

    ::log::info!("Setting password");
    let otp_page = password_page.password(&credentials.password).await?;

    match otp_page.load(timing.load_timeout).await {
        Ok(()) => {}
        Err(e) if e.is_timeout() => {
            ::log::info!("No one-time code requested");
            return Ok(());
        }
        Err(e) => return Err(e),
    }

    let secret = credentials
        .totp_secret
        .as_ref()
        .ok_or(ScrapeError::MissingCredential(TOTP_ENV))?;
    ::log::info!("Setting one-time code");
    otp_page.otp(secret).await
}

/// Sign in, list every order and save the receipts not yet on disk
pub async fn scrape_receipts(
    session: &dyn BrowserSession,
    credentials: &Credentials,
    config: &ScraperConfig,
) -> Result<RunSummary> {
    let store = ReceiptStore::open(&config.receipts_dir)?;
    let filter = OrderLinkFilter::new(&config.order_links)
        .map_err(|e| ScrapeError::Config(format!("invalid order link pattern: {e}")))?;
    let timing = config.timing();

    sign_in(session, credentials, &config.site, timing).await?;

    let orders = collect_order_ids(session, &config.site, &filter, timing).await?;
    let mut summary = RunSummary {
        orders_found: orders.len(),
        ..RunSummary::default()
    };

    if orders.is_empty() {
        ::log::warn!("No orders found on page");
        return Ok(summary);
    }

    let pending = pending_orders(&orders, &store);
    summary.already_saved = orders.len() - pending.len();

    if pending.is_empty() {
        ::log::info!(
            "No new orders. Found {}/{}",
            summary.already_saved,
            orders.len()
        );
        return Ok(summary);
    }

    if config.dry_run {
        for order_id in &pending {
            ::log::info!("Would download receipt for order: {}", order_id);
        }
        summary.pending = pending;
        return Ok(summary);
    }

    summary.downloaded = fetch_receipts(session, &config.site, &store, &pending, timing).await?;
    Ok(summary)
}
