use serde::Serialize;

/// Output columns, in row order.
pub const COLUMNS: [&str; 8] = [
    "web_id",
    "name",
    "isin",
    "value_eur",
    "var_1day_fund_%",
    "var_4week_fund_%",
    "var_1day_cat_%",
    "var_4week_cat_%",
];

/// One scraped fund. Field order matches `COLUMNS`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FundRecord {
    pub web_id: String,
    pub name: String,
    pub isin: String,
    pub value_eur: String,
    #[serde(rename = "var_1day_fund_%")]
    pub var_1day_fund: String,
    #[serde(rename = "var_4week_fund_%")]
    pub var_4week_fund: String,
    #[serde(rename = "var_1day_cat_%")]
    pub var_1day_cat: String,
    #[serde(rename = "var_4week_cat_%")]
    pub var_4week_cat: String,
}

impl FundRecord {
    pub fn new(web_id: impl Into<String>) -> Self {
        Self {
            web_id: web_id.into(),
            name: String::new(),
            isin: String::new(),
            value_eur: String::new(),
            var_1day_fund: String::new(),
            var_4week_fund: String::new(),
            var_1day_cat: String::new(),
            var_4week_cat: String::new(),
        }
    }
}
