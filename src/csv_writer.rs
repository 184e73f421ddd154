use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use csv::{QuoteStyle, Writer, WriterBuilder};

use crate::error::AppError;
use crate::models::{FundRecord, COLUMNS};

/// `fund_list_<YYYYMMDD>.csv`, relative to the working directory.
pub fn output_file_name(date: NaiveDate) -> PathBuf {
    PathBuf::from(format!("fund_list_{}.csv", date.format("%Y%m%d")))
}

/// Pipe-delimited exporter. Values are written verbatim, never quoted, so
/// a value containing `|` shifts the columns of its row.
pub struct CsvExporter {
    path: PathBuf,
}

impl CsvExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncate (or create) the file and write the header line.
    pub fn write_header(&self) -> Result<(), AppError> {
        let file = File::create(&self.path).map_err(|source| self.io_error(source))?;
        let mut writer = pipe_writer(file);
        writer
            .write_record(COLUMNS)
            .map_err(|source| self.output_error(source))?;
        writer.flush().map_err(|source| self.io_error(source))?;
        Ok(())
    }

    /// Reopen the file in append mode and add one row.
    pub fn write_fund(&self, fund: &FundRecord) -> Result<(), AppError> {
        let file = OpenOptions::new()
            .append(true)
            .open(&self.path)
            .map_err(|source| self.io_error(source))?;
        let mut writer = pipe_writer(file);
        writer
            .serialize(fund)
            .map_err(|source| self.output_error(source))?;
        writer.flush().map_err(|source| self.io_error(source))?;
        Ok(())
    }

    fn output_error(&self, source: csv::Error) -> AppError {
        AppError::Output {
            path: self.path.clone(),
            source,
        }
    }

    fn io_error(&self, source: io::Error) -> AppError {
        AppError::OutputIo {
            path: self.path.clone(),
            source,
        }
    }
}

fn pipe_writer(file: File) -> Writer<File> {
    WriterBuilder::new()
        .delimiter(b'|')
        .quote_style(QuoteStyle::Never)
        .has_headers(false)
        .from_writer(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const HEADER: &str =
        "web_id|name|isin|value_eur|var_1day_fund_%|var_4week_fund_%|var_1day_cat_%|var_4week_cat_%";

    fn sample(web_id: &str) -> FundRecord {
        FundRecord {
            web_id: web_id.into(),
            name: "Fund One".into(),
            isin: "FR0000000001".into(),
            value_eur: "123.45".into(),
            var_1day_fund: "0.12".into(),
            var_4week_fund: "1.23".into(),
            var_1day_cat: "0.05".into(),
            var_4week_cat: "0.98".into(),
        }
    }

    #[test]
    fn file_name_embeds_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 7).unwrap();
        assert_eq!(output_file_name(date), PathBuf::from("fund_list_20240307.csv"));
    }

    #[test]
    fn header_then_rows_in_column_order() {
        let dir = tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path().join("out.csv"));
        exporter.write_header().unwrap();
        exporter.write_fund(&sample("F1")).unwrap();
        exporter.write_fund(&sample("F2")).unwrap();

        let written = fs::read_to_string(exporter.path()).unwrap();
        assert_eq!(
            written,
            format!(
                "{HEADER}\n\
                 F1|Fund One|FR0000000001|123.45|0.12|1.23|0.05|0.98\n\
                 F2|Fund One|FR0000000001|123.45|0.12|1.23|0.05|0.98\n"
            )
        );
    }

    #[test]
    fn header_recreates_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        fs::write(&path, "stale content\nfrom an earlier run\n").unwrap();

        CsvExporter::new(&path).write_header().unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), format!("{HEADER}\n"));
    }

    #[test]
    fn embedded_delimiter_is_not_escaped() {
        let dir = tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path().join("out.csv"));
        exporter.write_header().unwrap();
        let mut fund = sample("F1");
        fund.name = "Fund | Two".into();
        exporter.write_fund(&fund).unwrap();

        let written = fs::read_to_string(exporter.path()).unwrap();
        let row = written.lines().nth(1).unwrap();
        assert!(row.starts_with("F1|Fund | Two|FR0000000001|"));
        assert_eq!(row.split('|').count(), COLUMNS.len() + 1);
    }

    #[test]
    fn appending_without_header_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("never-created.csv");
        let err = CsvExporter::new(&path).write_fund(&sample("F1")).unwrap_err();

        assert!(matches!(err, AppError::OutputIo { .. }));
        assert!(err.to_string().contains(&path.display().to_string()));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn header_into_missing_directory_names_the_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("no-such-dir").join("out.csv");
        let err = CsvExporter::new(&path).write_header().unwrap_err();

        match err {
            AppError::OutputIo { path: reported, .. } => assert_eq!(reported, path),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
