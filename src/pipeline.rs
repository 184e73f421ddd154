use std::io::{BufRead, Write};
use std::path::Path;

use tracing::{debug, info};

use crate::browser::PageFetcher;
use crate::config::SiteConfig;
use crate::csv_writer::CsvExporter;
use crate::error::AppError;
use crate::extract::FundPageParser;
use crate::input::load_fund_ids;
use crate::models::FundRecord;
use crate::prompt;

/// Load the id list, then (re)create the output with its header. A bad
/// input file leaves no output file behind.
pub fn init(input: &Path, exporter: &CsvExporter) -> Result<Vec<String>, AppError> {
    let ids = load_fund_ids(input)?;
    exporter.write_header()?;
    debug!("Header written to {}", exporter.path().display());
    Ok(ids)
}

/// Fetch, parse and append each fund in order. The first failure ends the run.
pub struct Pipeline<F, P> {
    fetcher: F,
    parser: P,
    site: SiteConfig,
    exporter: CsvExporter,
}

impl<F: PageFetcher, P: FundPageParser> Pipeline<F, P> {
    pub fn new(fetcher: F, parser: P, site: SiteConfig, exporter: CsvExporter) -> Self {
        Self {
            fetcher,
            parser,
            site,
            exporter,
        }
    }

    /// Confirm with the user, then load the ids, write the header and scrape
    /// every fund. Returns `None` when the user declines; nothing is read or
    /// written in that case.
    pub async fn confirm_and_run<R: BufRead, W: Write>(
        &mut self,
        answers: R,
        prompt_out: W,
        input: &Path,
    ) -> Result<Option<usize>, AppError> {
        if !prompt::confirm(answers, prompt_out)? {
            info!("Aborted, nothing was scraped");
            return Ok(None);
        }

        let fund_ids = init(input, &self.exporter)?;
        self.run(&fund_ids).await.map(Some)
    }

    /// Returns the number of rows written.
    pub async fn run(&mut self, fund_ids: &[String]) -> Result<usize, AppError> {
        let total = fund_ids.len();

        for (idx, fund_id) in fund_ids.iter().enumerate() {
            info!("({}/{}) Scraping fund {}", idx + 1, total, fund_id);

            let fund = self.scrape_one(fund_id).await?;
            self.exporter.write_fund(&fund)?;

            info!(
                "Fund {} saved to {}",
                fund_id,
                self.exporter.path().display()
            );
        }

        Ok(total)
    }

    async fn scrape_one(&mut self, fund_id: &str) -> Result<FundRecord, AppError> {
        let url = self.site.fund_url(fund_id);
        let page = self.fetcher.fetch(&url).await?;
        page.ensure_found(&self.site.not_found_title)?;

        self.parser.parse(fund_id, &page).map_err(|source| {
            debug!("Extraction failed for {}: {}", url, source);
            AppError::UnexpectedFormat { url, source }
        })
    }
}
