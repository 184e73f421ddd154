use scraper::{ElementRef, Html, Selector};

use crate::browser::FetchedPage;
use crate::error::FormatError;
use crate::models::FundRecord;

// Token positions in the whitespace-split text of the first table.
const VAR_1DAY_FUND: usize = 8;
const VAR_4WEEK_FUND: usize = 16;
const VAR_1DAY_CAT: usize = 10;
const VAR_4WEEK_CAT: usize = 18;

/// Turns a loaded fund page into a record.
pub trait FundPageParser {
    fn parse(&self, web_id: &str, page: &FetchedPage) -> Result<FundRecord, FormatError>;
}

/// Positional extraction tied to the site's current markup. Any layout
/// change surfaces as a `FormatError`.
pub struct PositionalParser {
    converted_value_class: String,
}

impl PositionalParser {
    pub fn new(converted_value_class: impl Into<String>) -> Self {
        Self {
            converted_value_class: converted_value_class.into(),
        }
    }
}

impl FundPageParser for PositionalParser {
    fn parse(&self, web_id: &str, page: &FetchedPage) -> Result<FundRecord, FormatError> {
        let mut fund = FundRecord::new(web_id);

        let title = page.title.as_deref().ok_or(FormatError::MissingTitle)?;
        fund.name = name_from_title(title);
        fund.isin = isin_from_title(title)?;

        let doc = Html::parse_document(&page.html);

        let value_text = first_text(&doc, &format!(".{}", self.converted_value_class))?;
        fund.value_eur = converted_value(&value_text)?;

        let table_text = first_text(&doc, "table")?;
        let tokens: Vec<&str> = table_text.split_whitespace().collect();
        fund.var_1day_fund = token(&tokens, "var_1day_fund_%", VAR_1DAY_FUND)?;
        fund.var_4week_fund = token(&tokens, "var_4week_fund_%", VAR_4WEEK_FUND)?;
        fund.var_1day_cat = token(&tokens, "var_1day_cat_%", VAR_1DAY_CAT)?;
        fund.var_4week_cat = token(&tokens, "var_4week_cat_%", VAR_4WEEK_CAT)?;

        Ok(fund)
    }
}

fn name_from_title(title: &str) -> String {
    title.split('|').next().unwrap_or_default().trim().to_string()
}

fn isin_from_title(title: &str) -> Result<String, FormatError> {
    title
        .rsplit('|')
        .next()
        .and_then(|tail| tail.split_whitespace().next())
        .map(str::to_string)
        .ok_or_else(|| FormatError::MissingIsin(title.to_string()))
}

/// `"Valeur = 123.45 EUR"` -> `"123.45"`
fn converted_value(text: &str) -> Result<String, FormatError> {
    let after_eq = text
        .split('=')
        .nth(1)
        .ok_or_else(|| FormatError::MissingMarker {
            marker: "=",
            text: text.to_string(),
        })?;
    let value = after_eq.split("EUR").next().unwrap_or(after_eq);
    Ok(value.trim().to_string())
}

fn first_text(doc: &Html, selector: &str) -> Result<String, FormatError> {
    let parsed =
        Selector::parse(selector).map_err(|_| FormatError::InvalidSelector(selector.to_string()))?;
    doc.select(&parsed)
        .next()
        .map(element_text)
        .ok_or_else(|| FormatError::MissingElement(selector.to_string()))
}

/// Descendant text nodes joined by a space, so adjacent cells never merge
/// into one token.
fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ")
}

fn token(tokens: &[&str], field: &'static str, index: usize) -> Result<String, FormatError> {
    tokens
        .get(index)
        .map(|t| t.to_string())
        .ok_or(FormatError::MissingToken {
            field,
            index,
            found: tokens.len(),
        })
}
