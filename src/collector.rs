use crate::config::{SiteUrls, Timing};
use crate::error::Result;
use crate::filter::OrderLinkFilter;
use crate::pages::{Loadable, OrdersSummaryPage};
use crate::results::OrderId;
use crate::session::BrowserSession;
use std::collections::HashSet;

/// Walk the order history from its first page to its last and gather every order id.
///
/// Each page is fully read before the next one is requested. A first page that
/// never shows an order link is taken to be an empty history and yields an empty
/// set; a later page that fails to load aborts the walk.
pub async fn collect_order_ids(
    session: &dyn BrowserSession,
    site: &SiteUrls,
    filter: &OrderLinkFilter,
    timing: Timing,
) -> Result<HashSet<OrderId>> {
    let first = OrdersSummaryPage::open(session, site, filter, None, timing).await?;
    if let Err(e) = first.load(timing.load_timeout).await {
        if e.is_timeout() {
            ::log::debug!("First order history page never listed an order: {}", e);
            return Ok(HashSet::new());
        }
        return Err(e);
    }

    let mut orders = HashSet::new();
    let mut pages = 0usize;
    let mut current = Some(first);

    while let Some(page) = current {
        pages += 1;
        let ids = page.order_ids().await?;
        ::log::info!("Page {}: {} orders ({})", pages, ids.len(), page.url());
        orders.extend(ids);

        current = page.maybe_next_page().await?;
        if let Some(next) = &current {
            next.load(timing.load_timeout).await?;
        }
    }

    ::log::info!(
        "Collected {} unique orders across {} pages",
        orders.len(),
        pages
    );
    Ok(orders)
}
