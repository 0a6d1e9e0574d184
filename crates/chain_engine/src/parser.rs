use chain_core::{OptionRow, OptionType};
use scraper::{ElementRef, Html, Selector};

/// Turns the currently rendered option table into structured rows. Pure
/// function of page content; no knowledge of expirations or navigation.
pub trait TableParser: Send + Sync {
    fn parse_visible_table(&self, page_content: &str) -> Vec<OptionRow>;
}

/// Parser for a header-labelled option table:
/// - column meaning is taken from the header row, not from position
/// - numbers tolerate thousands separators and `%` suffixes
/// - dash placeholders are absent values
/// - rows without a strike or a recognizable type are skipped.
#[derive(Debug, Default)]
pub struct DomTableParser;

impl TableParser for DomTableParser {
    fn parse_visible_table(&self, page_content: &str) -> Vec<OptionRow> {
        let doc = Html::parse_document(page_content);
        let (Ok(row_sel), Ok(header_sel), Ok(cell_sel)) = (
            Selector::parse("tr"),
            Selector::parse("th"),
            Selector::parse("td"),
        ) else {
            return Vec::new();
        };

        let mut columns: Option<ColumnMap> = None;
        let mut rows = Vec::new();
        for row in doc.select(&row_sel) {
            let headers: Vec<String> = row.select(&header_sel).map(cell_text).collect();
            if !headers.is_empty() {
                if columns.is_none() {
                    columns = ColumnMap::from_headers(&headers);
                }
                continue;
            }
            let Some(map) = &columns else { continue };
            let cells: Vec<String> = row.select(&cell_sel).map(cell_text).collect();
            if cells.is_empty() {
                continue;
            }
            if let Some(parsed) = map.row_from_cells(&cells) {
                rows.push(parsed);
            }
        }
        rows
    }
}

fn cell_text(cell: ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

#[derive(Debug)]
struct ColumnMap {
    strike: usize,
    option_type: usize,
    bid: Option<usize>,
    ask: Option<usize>,
    last: Option<usize>,
    volume: Option<usize>,
    open_interest: Option<usize>,
    implied_volatility: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &[String]) -> Option<Self> {
        let find = |names: &[&str]| {
            headers.iter().position(|header| {
                let header = header.to_ascii_lowercase();
                names.iter().any(|name| header == *name)
            })
        };
        Some(Self {
            strike: find(&["strike"])?,
            option_type: find(&["type", "side"])?,
            bid: find(&["bid"]),
            ask: find(&["ask"]),
            last: find(&["last", "price"]),
            volume: find(&["volume", "vol"]),
            open_interest: find(&["open interest", "oi"]),
            implied_volatility: find(&["iv", "implied volatility"]),
        })
    }

    fn row_from_cells(&self, cells: &[String]) -> Option<OptionRow> {
        let strike = parse_number(cells.get(self.strike)?)?;
        let option_type = OptionType::parse(cells.get(self.option_type)?)?;
        let field =
            |index: Option<usize>| index.and_then(|i| cells.get(i)).and_then(|c| parse_number(c));
        Some(OptionRow {
            option_type,
            strike,
            bid: field(self.bid),
            ask: field(self.ask),
            last: field(self.last),
            volume: field(self.volume).map(|v| v as u64),
            open_interest: field(self.open_interest).map(|v| v as u64),
            implied_volatility: field(self.implied_volatility),
        })
    }
}

/// `"6,950.00"` -> `6950.0`; `"23.4%"` -> `23.4`; dashes and blanks -> `None`.
fn parse_number(text: &str) -> Option<f64> {
    let cleaned = text.trim().replace(',', "");
    let cleaned = cleaned.trim_end_matches('%');
    if cleaned.is_empty() || cleaned == "-" || cleaned == "—" {
        return None;
    }
    cleaned.parse().ok()
}
