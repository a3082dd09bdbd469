use crate::config::{SiteUrls, Timing};
use crate::error::Result;
use crate::pages::{Loadable, OrderPage};
use crate::receipts::ReceiptStore;
use crate::results::OrderId;
use crate::session::BrowserSession;
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashSet;

/// Orders without a saved receipt, sorted so logs read the same run to run
pub fn pending_orders(known: &HashSet<OrderId>, store: &ReceiptStore) -> Vec<OrderId> {
    let mut pending: Vec<OrderId> = known
        .iter()
        .filter(|id| !store.contains(id))
        .cloned()
        .collect();
    pending.sort();
    pending
}

fn progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );
    pb
}

/// Download and save each receipt in turn.
///
/// Stops at the first failure; receipts saved before it stay on disk.
pub async fn fetch_receipts(
    session: &dyn BrowserSession,
    site: &SiteUrls,
    store: &ReceiptStore,
    orders: &[OrderId],
    timing: Timing,
) -> Result<Vec<OrderId>> {
    let total = orders.len();
    let mut saved = Vec::with_capacity(total);
    let pb = progress_bar(total);

    for (index, order_id) in orders.iter().enumerate() {
        pb.set_message(order_id.to_string());
        ::log::debug!(
            "[{}/{}] Downloading receipt for order: {}",
            index + 1,
            total,
            order_id
        );
        let page = OrderPage::open(session, site, order_id.clone(), timing).await?;
        page.load(timing.load_timeout).await?;

        let markup = page.markup().await?;
        let path = store.save(order_id, &markup)?;
        ::log::debug!("Saved {} bytes to {}", markup.len(), path.display());
        saved.push(order_id.clone());
        pb.inc(1);
    }

    pb.finish_with_message("done");
    ::log::info!("Saved {} receipts to {}", saved.len(), store.dir().display());
    Ok(saved)
}
