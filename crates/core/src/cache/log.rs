//! Append-only access log of cache population events.
//!
//! One line per miss: `<YYYY-MM-DD HH:MM:SS.mmm> <key> <url>\n`, timestamps
//! in local time. Lines are never rewritten.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local, NaiveDateTime};
use tokio::io::AsyncWriteExt;

use super::key::CacheKey;
use crate::Error;

/// File name of the log inside the cache directory.
pub const LOG_FILE: &str = "log";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

/// Fixed-width local timestamp with millisecond precision.
pub fn format_timestamp(at: &DateTime<Local>) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}

/// A parsed log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: NaiveDateTime,
    pub key: String,
    pub url: String,
}

impl LogRecord {
    fn parse(line: &str) -> Option<Self> {
        let mut parts = line.splitn(4, ' ');
        let date = parts.next()?;
        let time = parts.next()?;
        let key = parts.next()?;
        let url = parts.next()?;

        let timestamp = NaiveDateTime::parse_from_str(&format!("{date} {time}"), TIMESTAMP_FORMAT).ok()?;
        Some(Self { timestamp, key: key.to_string(), url: url.to_string() })
    }
}

impl std::fmt::Display for LogRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.timestamp.format(TIMESTAMP_FORMAT), self.key, self.url)
    }
}

/// Access log owned by one cache instance.
#[derive(Debug, Clone)]
pub struct AccessLog {
    path: PathBuf,
}

impl AccessLog {
    /// Log stored as [`LOG_FILE`] inside `dir`.
    pub fn in_dir(dir: &Path) -> Self {
        Self { path: dir.join(LOG_FILE) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record. The line is written with a single append-mode write.
    pub async fn append(&self, at: &DateTime<Local>, key: &CacheKey, url: &str) -> Result<(), Error> {
        let line = format!("{} {} {}\n", format_timestamp(at), key, url);

        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| Error::storage(&self.path, e))?;

        file.write_all(line.as_bytes())
            .await
            .map_err(|e| Error::storage(&self.path, e))?;
        file.flush().await.map_err(|e| Error::storage(&self.path, e))?;

        Ok(())
    }

    /// Read every record back. A missing log is empty.
    pub async fn records(&self) -> Result<Vec<LogRecord>, Error> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(Error::storage(&self.path, e)),
        };

        Ok(text
            .lines()
            .enumerate()
            .filter_map(|(idx, line)| {
                let record = LogRecord::parse(line);
                if record.is_none() {
                    tracing::warn!(line = idx + 1, "skipping malformed access log line");
                }
                record
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    #[test]
    fn test_format_timestamp_zero_padded() {
        let at = Local.with_ymd_and_hms(2024, 3, 7, 4, 5, 6).unwrap() + chrono::Duration::milliseconds(9);
        assert_eq!(format_timestamp(&at), "2024-03-07 04:05:06.009");
    }

    #[test]
    fn test_format_timestamp_fixed_width() {
        let a = Local.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let b = Local.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap() + chrono::Duration::milliseconds(999);
        assert_eq!(format_timestamp(&a).len(), 23);
        assert_eq!(format_timestamp(&b), "2024-12-31 23:59:59.999");
    }

    #[test]
    fn test_parse_record() {
        let record = LogRecord::parse("2024-03-07 04:05:06.009 abc_-123 https://example.com/a b").unwrap();
        assert_eq!(record.key, "abc_-123");
        assert_eq!(record.url, "https://example.com/a b");
        assert_eq!(record.to_string(), "2024-03-07 04:05:06.009 abc_-123 https://example.com/a b");
    }

    #[test]
    fn test_parse_record_malformed() {
        assert!(LogRecord::parse("").is_none());
        assert!(LogRecord::parse("not a timestamp key url").is_none());
        assert!(LogRecord::parse("2024-03-07 04:05:06.009 keyonly").is_none());
    }

    #[tokio::test]
    async fn test_append_creates_and_appends() {
        let temp = TempDir::new().unwrap();
        let log = AccessLog::in_dir(temp.path());
        let key = CacheKey::derive("https://example.com/a");
        let at = Local.with_ymd_and_hms(2024, 3, 7, 4, 5, 6).unwrap();

        log.append(&at, &key, "https://example.com/a").await.unwrap();
        log.append(&at, &key, "https://example.com/a").await.unwrap();

        let text = std::fs::read_to_string(log.path()).unwrap();
        let expected = format!("2024-03-07 04:05:06.000 {key} https://example.com/a\n");
        assert_eq!(text, expected.repeat(2));
    }

    #[tokio::test]
    async fn test_records_round_trip_and_skip_malformed() {
        let temp = TempDir::new().unwrap();
        let log = AccessLog::in_dir(temp.path());
        let key = CacheKey::derive("https://example.com/a");
        let at = Local::now();

        log.append(&at, &key, "https://example.com/a").await.unwrap();
        std::fs::OpenOptions::new()
            .append(true)
            .open(log.path())
            .and_then(|mut f| std::io::Write::write_all(&mut f, b"garbage\n"))
            .unwrap();
        log.append(&at, &key, "https://example.com/a").await.unwrap();

        let records = log.records().await.unwrap();
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|r| r.key == key.as_str()));
    }

    #[tokio::test]
    async fn test_records_missing_log() {
        let temp = TempDir::new().unwrap();
        let log = AccessLog::in_dir(temp.path());
        assert!(log.records().await.unwrap().is_empty());
    }
}
