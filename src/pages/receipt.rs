use crate::config::{SiteUrls, Timing};
use crate::error::Result;
use crate::pages::Loadable;
use crate::results::OrderId;
use crate::session::BrowserSession;
use async_trait::async_trait;

/// Printable summary of a single order
pub struct OrderPage<'a> {
    session: &'a dyn BrowserSession,
    order_id: OrderId,
    timing: Timing,
}

impl<'a> OrderPage<'a> {
    /// Navigate to the printable receipt of `order_id`
    pub async fn open(
        session: &'a dyn BrowserSession,
        site: &SiteUrls,
        order_id: OrderId,
        timing: Timing,
    ) -> Result<Self> {
        session.goto(&site.receipt_url(&order_id)?).await?;
        Ok(Self {
            session,
            order_id,
            timing,
        })
    }

    pub fn order_id(&self) -> &OrderId {
        &self.order_id
    }

    /// Rendered markup of the receipt
    pub async fn markup(&self) -> Result<String> {
        Ok(self.session.source().await?)
    }
}

#[async_trait]
impl Loadable for OrderPage<'_> {
    fn name(&self) -> &str {
        "order receipt page"
    }

    fn timing(&self) -> Timing {
        self.timing
    }

    // The page is considered rendered once the order id shows up anywhere in it
    async fn did_load(&self) -> bool {
        match self.session.source().await {
            Ok(markup) => markup.contains(self.order_id.as_str()),
            Err(_) => false,
        }
    }
}
