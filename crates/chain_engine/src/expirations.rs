use chrono::NaiveDate;

/// One entry from the page's expiration selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredExpiration {
    /// `YYYYMMDD` code, the identifier used across the message contract.
    pub date_code: String,
    /// Short human label, e.g. `Jan 20`.
    pub label: String,
}

/// Parses raw selector titles of the form `"Jan 20, 2026 (4) ESH26 E3B"`,
/// keeping page order and dropping duplicates and titles that carry no date.
pub fn parse_expiration_titles(titles: &[String]) -> Vec<DiscoveredExpiration> {
    let mut out: Vec<DiscoveredExpiration> = Vec::new();
    for title in titles {
        let Some(expiration) = parse_title(title) else {
            continue;
        };
        if out.iter().all(|seen| seen.date_code != expiration.date_code) {
            out.push(expiration);
        }
    }
    out
}

fn parse_title(title: &str) -> Option<DiscoveredExpiration> {
    let mut tokens = title.split_whitespace();
    let month = tokens.next()?;
    let day = tokens.next()?;
    let year = tokens.next()?;

    let date_text = format!("{month} {day} {year}");
    let date = NaiveDate::parse_from_str(&date_text, "%b %d, %Y").ok()?;
    Some(DiscoveredExpiration {
        date_code: date.format("%Y%m%d").to_string(),
        label: format!("{month} {}", day.trim_end_matches(',')),
    })
}
