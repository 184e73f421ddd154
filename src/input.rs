use std::fs;
use std::io;
use std::path::Path;

use tracing::{debug, info};

use crate::error::AppError;

/// Read the fund id list: one id per line, blank lines skipped, order and
/// duplicates preserved.
pub fn load_fund_ids(path: &Path) -> Result<Vec<String>, AppError> {
    let path = std::path::absolute(path).map_err(|source| AppError::InputUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    debug!("Reading fund ids from {}", path.display());

    let metadata = match fs::metadata(&path) {
        Ok(m) => m,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(AppError::InputNotFound(path));
        }
        Err(source) => return Err(AppError::InputUnreadable { path, source }),
    };
    if !metadata.is_file() {
        return Err(AppError::InputUnreadable {
            path,
            source: io::Error::new(io::ErrorKind::InvalidInput, "not a regular file"),
        });
    }

    let contents = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(source) => return Err(AppError::InputUnreadable { path, source }),
    };

    let ids = parse_fund_ids(&contents);
    if ids.is_empty() {
        return Err(AppError::InputEmpty(path));
    }

    info!("Found {} fund ids in {}", ids.len(), path.display());
    Ok(ids)
}

fn parse_fund_ids(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{tempdir, NamedTempFile};

    fn write_input(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn skips_blank_lines_and_keeps_order() {
        let file = write_input("F3\n\n  F1  \r\n\t\nF2\n");
        let ids = load_fund_ids(file.path()).unwrap();
        assert_eq!(ids, vec!["F3", "F1", "F2"]);
    }

    #[test]
    fn duplicates_are_kept() {
        let file = write_input("F1\nF1\nF2\nF1");
        let ids = load_fund_ids(file.path()).unwrap();
        assert_eq!(ids, vec!["F1", "F1", "F2", "F1"]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = load_fund_ids(&dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, AppError::InputNotFound(_)));
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn zero_byte_file_is_empty() {
        let file = write_input("");
        let err = load_fund_ids(file.path()).unwrap_err();
        assert!(matches!(err, AppError::InputEmpty(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn whitespace_only_file_is_empty() {
        let file = write_input("\n   \n\t\n");
        assert!(matches!(
            load_fund_ids(file.path()),
            Err(AppError::InputEmpty(_))
        ));
    }

    #[test]
    fn directory_is_unreadable() {
        let dir = tempdir().unwrap();
        let err = load_fund_ids(dir.path()).unwrap_err();
        assert!(matches!(err, AppError::InputUnreadable { .. }));
        assert_eq!(err.exit_code(), 4);
    }

    #[test]
    fn invalid_utf8_is_unreadable() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(&[0x46, 0x31, 0x0a, 0xff, 0xfe]).unwrap();
        assert!(matches!(
            load_fund_ids(file.path()),
            Err(AppError::InputUnreadable { .. })
        ));
    }

    #[test]
    fn errors_report_absolute_path() {
        let err = load_fund_ids(Path::new("surely/missing/ids.txt")).unwrap_err();
        match err {
            AppError::InputNotFound(path) => assert!(path.is_absolute()),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
