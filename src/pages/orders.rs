use crate::config::{SiteUrls, Timing};
use crate::error::Result;
use crate::filter::OrderLinkFilter;
use crate::pages::Loadable;
use crate::results::OrderId;
use crate::session::{BrowserSession, Locator};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::LazyLock;
use url::Url;

/// Anchors pointing at either of the order-detail pages
static ORDER_LINKS: LazyLock<Locator> = LazyLock::new(|| {
    Locator::css(r#"[href*="gp/css/order-details"], [href*="/gp/your-account/order-details"]"#)
});

/// Pagination control that only carries a link while more pages follow
static NEXT_PAGE_LINK: LazyLock<Locator> =
    LazyLock::new(|| Locator::css("ul.a-pagination .a-last a"));

const ORDER_ID_PARAM: &str = "orderID";

/// Base used to read query parameters out of relative links
const RELATIVE_BASE: &str = "https://relative.invalid/";

/// Raw hyperlink to an order-detail page.
///
/// Example: `https://www.amazon.com/gp/css/order-details?orderID=111-1602829-9424211&ref=ppx_yo2ov_dt_b_fed_order_details`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderLink {
    pub href: String,
}

impl OrderLink {
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }

    /// The `orderID` query parameter, if the link carries a usable one
    pub fn order_id(&self) -> Option<OrderId> {
        let url = Url::parse(&self.href)
            .or_else(|_| Url::parse(RELATIVE_BASE).and_then(|base| base.join(&self.href)))
            .ok()?;
        let value = url
            .query_pairs()
            .find(|(key, _)| key == ORDER_ID_PARAM)
            .map(|(_, value)| value.into_owned())?;
        OrderId::new(value).ok()
    }
}

/// One page of the order history
pub struct OrdersSummaryPage<'a> {
    session: &'a dyn BrowserSession,
    site: &'a SiteUrls,
    filter: &'a OrderLinkFilter,
    timing: Timing,
    url: String,
}

impl<'a> OrdersSummaryPage<'a> {
    /// Navigate to `url`, or to the first history page when `None`
    pub async fn open(
        session: &'a dyn BrowserSession,
        site: &'a SiteUrls,
        filter: &'a OrderLinkFilter,
        url: Option<String>,
        timing: Timing,
    ) -> Result<Self> {
        let url = match url {
            Some(url) => url,
            None => site.order_history_url()?,
        };
        session.goto(&url).await?;
        Ok(Self {
            session,
            site,
            filter,
            timing,
            url,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Unique ids of every order linked from this page
    pub async fn order_ids(&self) -> Result<HashSet<OrderId>> {
        let hrefs = self.session.attributes(&ORDER_LINKS, "href").await?;

        let mut ids = HashSet::new();
        for href in hrefs.into_iter().flatten() {
            if !self.is_order_link(&href) {
                ::log::debug!("Ignoring non order link: {}", href);
                continue;
            }

            match OrderLink::new(href.as_str()).order_id() {
                Some(id) => {
                    ids.insert(id);
                }
                None => ::log::debug!("No usable {} in {}", ORDER_ID_PARAM, href),
            }
        }

        ::log::debug!("Found {} orders on {}", ids.len(), self.url);
        Ok(ids)
    }

    fn is_order_link(&self, href: &str) -> bool {
        self.site
            .resolve(href)
            .is_ok_and(|resolved| self.filter.is_order_link(&resolved))
    }

    /// Follow the pagination control; `None` on the last page
    pub async fn maybe_next_page(&self) -> Result<Option<OrdersSummaryPage<'a>>> {
        let href = match self.session.attribute(&NEXT_PAGE_LINK, "href").await {
            Ok(Some(href)) => href,
            Ok(None) => return Ok(None),
            Err(e) if e.is_no_such_element() => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let next_url = self.site.resolve(&href)?.to_string();
        ::log::info!("Moving to next order history page: {}", next_url);
        let page = Self::open(
            self.session,
            self.site,
            self.filter,
            Some(next_url),
            self.timing,
        )
        .await?;
        Ok(Some(page))
    }
}

#[async_trait]
impl Loadable for OrdersSummaryPage<'_> {
    fn name(&self) -> &str {
        "order history page"
    }

    fn timing(&self) -> Timing {
        self.timing
    }

    // Ready once a link survives the same filter `order_ids` applies
    async fn did_load(&self) -> bool {
        match self.session.attributes(&ORDER_LINKS, "href").await {
            Ok(hrefs) => hrefs
                .iter()
                .flatten()
                .any(|href| self.is_order_link(href)),
            Err(_) => false,
        }
    }
}
