use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

/// Path fragments of the known order-detail pages
pub const DEFAULT_ORDER_LINK_PATTERNS: [&str; 2] =
    [r"gp/css/order-details", r"/gp/your-account/order-details"];

/// Rules deciding which hyperlinks point at an order-detail page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLinkFilterConfig {
    /// Regex patterns; a link must match at least one
    #[serde(default = "default_include_patterns")]
    pub include_patterns: Vec<String>,

    /// Regex patterns for links to reject (these take precedence over include patterns)
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

fn default_include_patterns() -> Vec<String> {
    DEFAULT_ORDER_LINK_PATTERNS
        .iter()
        .map(|p| p.to_string())
        .collect()
}

impl Default for OrderLinkFilterConfig {
    fn default() -> Self {
        Self {
            include_patterns: default_include_patterns(),
            exclude_patterns: Vec::new(),
        }
    }
}

/// Compiled form of [`OrderLinkFilterConfig`]
#[derive(Debug)]
pub struct OrderLinkFilter {
    include_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
}

impl Default for OrderLinkFilter {
    fn default() -> Self {
        Self::new(&OrderLinkFilterConfig::default()).expect("Default regex patterns should be valid")
    }
}

impl OrderLinkFilter {
    pub fn new(config: &OrderLinkFilterConfig) -> Result<Self, regex::Error> {
        let include_regexes = config
            .include_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;
        let exclude_regexes = config
            .exclude_patterns
            .iter()
            .map(|p| Regex::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            include_regexes,
            exclude_regexes,
        })
    }

    /// Whether `url` is an order-detail link
    pub fn is_order_link(&self, url: &Url) -> bool {
        let url_str = url.as_str();
        if self.exclude_regexes.iter().any(|r| r.is_match(url_str)) {
            return false;
        }
        self.include_regexes.iter().any(|r| r.is_match(url_str))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_default_filter_accepts_both_detail_pages() {
        let filter = OrderLinkFilter::default();
        assert!(filter.is_order_link(&url(
            "https://www.amazon.com/gp/css/order-details?orderID=111-1602829-9424211&ref=ppx_yo2ov_dt_b_fed_order_details"
        )));
        assert!(filter.is_order_link(&url(
            "https://www.amazon.com/gp/your-account/order-details?ie=UTF8&orderID=112-0000000-0000000"
        )));
    }

    #[test]
    fn test_default_filter_rejects_other_links() {
        let filter = OrderLinkFilter::default();
        assert!(!filter.is_order_link(&url("https://www.amazon.com/gp/css/order-history")));
        assert!(!filter.is_order_link(&url("https://www.amazon.com/dp/B000000000")));
    }

    #[test]
    fn test_exclude_takes_precedence() {
        let config = OrderLinkFilterConfig {
            exclude_patterns: vec![r"ref=digital".to_string()],
            ..OrderLinkFilterConfig::default()
        };
        let filter = OrderLinkFilter::new(&config).unwrap();
        assert!(!filter.is_order_link(&url(
            "https://www.amazon.com/gp/css/order-details?orderID=D01-1&ref=digital"
        )));
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let config = OrderLinkFilterConfig {
            include_patterns: vec!["(".to_string()],
            exclude_patterns: vec![],
        };
        assert!(OrderLinkFilter::new(&config).is_err());
    }
}
