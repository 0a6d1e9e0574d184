use url::Url;

const CHAIN_BASE: &str = "https://www.tradingview.com/options/chain/";

/// Chain-page URL for an exchange-qualified ticker, e.g.
/// `https://www.tradingview.com/options/chain/CME_MINI-ESH2026/`.
/// The trailing slash matters; the chain page redirects without it.
pub fn chain_page_url(exchange: &str, ticker: &str) -> Url {
    let mut url = Url::parse(CHAIN_BASE).expect("static chain base url");
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty();
        segments.push(&format!("{exchange}-{ticker}"));
        segments.push("");
    }
    url
}

#[cfg(test)]
mod tests {
    use super::chain_page_url;

    #[test]
    fn builds_exchange_qualified_chain_url() {
        let url = chain_page_url("CME_MINI", "ESH2026");
        assert_eq!(
            url.as_str(),
            "https://www.tradingview.com/options/chain/CME_MINI-ESH2026/"
        );
    }

    #[test]
    fn unusual_ticker_characters_are_percent_encoded() {
        let url = chain_page_url("CME_MINI", "ES H6");
        assert_eq!(
            url.as_str(),
            "https://www.tradingview.com/options/chain/CME_MINI-ES%20H6/"
        );
    }
}
