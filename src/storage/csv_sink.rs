//! File-backed sink
//!
//! Each output file sits behind its own mutex. A row is written through a
//! quote-all `csv::Writer` and flushed while the lock is held, so rows from
//! concurrent pages never interleave.

use crate::config::OutputConfig;
use crate::crawler::Stage;
use crate::storage::traits::{Sink, StorageError, StorageResult};
use crate::storage::{ArticleRecord, UrlBatch, DATASET_COLUMNS};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// A single output file with a single-writer lock
#[derive(Debug)]
struct GuardedFile {
    path: PathBuf,
    lock: Mutex<()>,
}

impl GuardedFile {
    fn new(path: PathBuf) -> Self {
        Self {
            path,
            lock: Mutex::new(()),
        }
    }

    fn append<S: AsRef<str>>(&self, fields: &[S]) -> StorageResult<()> {
        self.write_row(fields, false)
    }

    fn overwrite<S: AsRef<str>>(&self, fields: &[S]) -> StorageResult<()> {
        self.write_row(fields, true)
    }

    /// Empties the file, creating it if needed
    fn truncate(&self) -> StorageResult<()> {
        let _guard = self.lock()?;
        self.open(true)?;
        Ok(())
    }

    fn lock(&self) -> StorageResult<std::sync::MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| StorageError::Poisoned(self.path.display().to_string()))
    }

    fn io_error(&self, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn open(&self, truncate: bool) -> StorageResult<File> {
        let mut options = OpenOptions::new();
        options.create(true);
        if truncate {
            options.write(true).truncate(true);
        } else {
            options.append(true);
        }
        options.open(&self.path).map_err(|e| self.io_error(e))
    }

    /// Writes one row; a row with no fields is a bare line terminator
    fn write_row<S: AsRef<str>>(&self, fields: &[S], truncate: bool) -> StorageResult<()> {
        let _guard = self.lock()?;
        let mut file = self.open(truncate)?;

        if fields.is_empty() {
            file.write_all(b"\n").map_err(|e| self.io_error(e))?;
            return file.flush().map_err(|e| self.io_error(e));
        }

        let mut writer = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::Any(b'\n'))
            .flexible(true)
            .from_writer(file);
        writer
            .write_record(fields.iter().map(|field| field.as_ref()))
            .map_err(|source| StorageError::Csv {
                path: self.path.display().to_string(),
                source,
            })?;
        writer.flush().map_err(|e| self.io_error(e))
    }
}

/// Sink writing the dataset and the three audit files as CSV
#[derive(Debug)]
pub struct CsvSink {
    dataset: GuardedFile,
    issue_urls: GuardedFile,
    article_urls: GuardedFile,
    metric_urls: GuardedFile,
}

impl CsvSink {
    /// Creates a sink over explicit paths
    pub fn new(
        dataset: PathBuf,
        issue_urls: PathBuf,
        article_urls: PathBuf,
        metric_urls: PathBuf,
    ) -> Self {
        Self {
            dataset: GuardedFile::new(dataset),
            issue_urls: GuardedFile::new(issue_urls),
            article_urls: GuardedFile::new(article_urls),
            metric_urls: GuardedFile::new(metric_urls),
        }
    }

    /// Creates a sink from the output templates, keyed by the lower year bound
    pub fn from_config(output: &OutputConfig, year: i32) -> Self {
        Self::new(
            output.render(&output.dataset, year),
            output.render(&output.issue_urls, year),
            output.render(&output.article_urls, year),
            output.render(&output.metric_urls, year),
        )
    }

    pub fn dataset_path(&self) -> &Path {
        &self.dataset.path
    }

    /// Path of the audit file that holds links found on pages of `stage`
    pub fn audit_path(&self, stage: Stage) -> Option<&Path> {
        self.audit_file(stage).map(|file| file.path.as_path())
    }

    /// Writes the dataset header, replacing any existing dataset
    pub fn init_dataset(&self) -> StorageResult<()> {
        self.dataset.overwrite(&DATASET_COLUMNS)
    }

    /// Writes the dataset header only if the dataset does not exist yet
    ///
    /// Returns true if the header was written.
    pub fn ensure_dataset(&self) -> StorageResult<bool> {
        if self.dataset.path.exists() {
            return Ok(false);
        }
        self.init_dataset()?;
        Ok(true)
    }

    /// Empties every audit file
    pub fn reset_audit_files(&self) -> StorageResult<()> {
        for file in [&self.issue_urls, &self.article_urls, &self.metric_urls] {
            file.truncate()?;
        }
        Ok(())
    }

    fn audit_file(&self, stage: Stage) -> Option<&GuardedFile> {
        match stage {
            Stage::Index => Some(&self.issue_urls),
            Stage::Issue => Some(&self.article_urls),
            Stage::Article => Some(&self.metric_urls),
            Stage::Metrics => None,
        }
    }
}

impl Sink for CsvSink {
    fn append(&self, record: &ArticleRecord) -> StorageResult<()> {
        self.dataset.append(&record.to_fields())
    }

    fn append_batch(&self, stage: Stage, batch: &UrlBatch) -> StorageResult<()> {
        let file = self
            .audit_file(stage)
            .ok_or(StorageError::NoAuditFile(stage))?;

        if stage == Stage::Index {
            file.overwrite(&batch.urls)
        } else {
            file.append(&batch.urls)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::TweetCount;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn sink_in(dir: &TempDir) -> CsvSink {
        CsvSink::new(
            dir.path().join("data.csv"),
            dir.path().join("issues.csv"),
            dir.path().join("articles.csv"),
            dir.path().join("metrics.csv"),
        )
    }

    fn record(title: &str) -> ArticleRecord {
        ArticleRecord {
            title: title.to_string(),
            volume: "1".to_string(),
            issue: "2".to_string(),
            date: "2020-01-01".to_string(),
            citations: 3,
            attention: 4,
            tweets: TweetCount::Absent,
            views: 5,
        }
    }

    #[test]
    fn test_init_dataset_writes_header() {
        let dir = TempDir::new().unwrap();
        let sink = sink_in(&dir);
        sink.init_dataset().unwrap();

        let content = std::fs::read_to_string(sink.dataset_path()).unwrap();
        assert_eq!(
            content,
            "\"article_title\",\"article_volume\",\"article_issue\",\"article_date\",\
             \"article_citations\",\"article_attention\",\"article_tweets\",\"article_views\"\n"
        );
    }

    #[test]
    fn test_ensure_dataset_keeps_existing_rows() {
        let dir = TempDir::new().unwrap();
        let sink = sink_in(&dir);

        assert!(sink.ensure_dataset().unwrap());
        sink.append(&record("First")).unwrap();
        assert!(!sink.ensure_dataset().unwrap());

        let content = std::fs::read_to_string(sink.dataset_path()).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_append_never_rewrites() {
        let dir = TempDir::new().unwrap();
        let sink = sink_in(&dir);
        sink.init_dataset().unwrap();
        sink.append(&record("First")).unwrap();
        sink.append(&record("Second")).unwrap();

        let content = std::fs::read_to_string(sink.dataset_path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "\"First\",\"1\",\"2\",\"2020-01-01\",\"3\",\"4\",\"0\",\"5\""
        );
        assert!(lines[2].starts_with("\"Second\""));
    }

    #[test]
    fn test_index_batch_overwrites() {
        let dir = TempDir::new().unwrap();
        let sink = sink_in(&dir);

        sink.append_batch(Stage::Index, &UrlBatch::new("seed", vec!["/a".into()]))
            .unwrap();
        sink.append_batch(Stage::Index, &UrlBatch::new("seed", vec!["/b".into()]))
            .unwrap();

        let path = sink.audit_path(Stage::Index).unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "\"/b\"\n");
    }

    #[test]
    fn test_issue_and_article_batches_append() {
        let dir = TempDir::new().unwrap();
        let sink = sink_in(&dir);

        sink.append_batch(
            Stage::Issue,
            &UrlBatch::new("issue-1", vec!["/x".into(), "/y".into()]),
        )
        .unwrap();
        sink.append_batch(Stage::Issue, &UrlBatch::new("issue-2", vec![]))
            .unwrap();
        sink.append_batch(Stage::Article, &UrlBatch::new("art", vec!["/m".into()]))
            .unwrap();

        let issues = std::fs::read_to_string(sink.audit_path(Stage::Issue).unwrap()).unwrap();
        assert_eq!(issues, "\"/x\",\"/y\"\n\n");

        let metrics = std::fs::read_to_string(sink.audit_path(Stage::Article).unwrap()).unwrap();
        assert_eq!(metrics, "\"/m\"\n");
    }

    #[test]
    fn test_fields_are_quoted_and_escaped() {
        let dir = TempDir::new().unwrap();
        let sink = sink_in(&dir);
        let urls = vec![
            "/say \"hi\"".to_string(),
            "/a,b".to_string(),
            "/c\nd".to_string(),
        ];
        sink.append_batch(Stage::Article, &UrlBatch::new("art", urls))
            .unwrap();

        let metrics = std::fs::read_to_string(sink.audit_path(Stage::Article).unwrap()).unwrap();
        assert_eq!(metrics, "\"/say \"\"hi\"\"\",\"/a,b\",\"/c\nd\"\n");
    }

    #[test]
    fn test_empty_index_batch_leaves_empty_line() {
        let dir = TempDir::new().unwrap();
        let sink = sink_in(&dir);
        sink.append_batch(Stage::Index, &UrlBatch::new("seed", vec!["/a".into()]))
            .unwrap();
        sink.append_batch(Stage::Index, &UrlBatch::default())
            .unwrap();

        let issues = std::fs::read_to_string(sink.audit_path(Stage::Index).unwrap()).unwrap();
        assert_eq!(issues, "\n");
    }

    #[test]
    fn test_metrics_stage_has_no_audit_file() {
        let dir = TempDir::new().unwrap();
        let sink = sink_in(&dir);
        let result = sink.append_batch(Stage::Metrics, &UrlBatch::default());
        assert!(matches!(result, Err(StorageError::NoAuditFile(Stage::Metrics))));
    }

    #[test]
    fn test_reset_audit_files() {
        let dir = TempDir::new().unwrap();
        let sink = sink_in(&dir);
        sink.append_batch(Stage::Issue, &UrlBatch::new("p", vec!["/x".into()]))
            .unwrap();
        sink.reset_audit_files().unwrap();

        let issues = std::fs::read_to_string(sink.audit_path(Stage::Issue).unwrap()).unwrap();
        assert!(issues.is_empty());
    }

    #[test]
    fn test_concurrent_appends_do_not_interleave() {
        let dir = TempDir::new().unwrap();
        let sink = Arc::new(sink_in(&dir));
        let long_title = "T".repeat(4096);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sink = Arc::clone(&sink);
                let title = long_title.clone();
                std::thread::spawn(move || {
                    for _ in 0..25 {
                        sink.append(&record(&title)).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let content = std::fs::read_to_string(sink.dataset_path()).unwrap();
        let expected = format!(
            "\"{}\",\"1\",\"2\",\"2020-01-01\",\"3\",\"4\",\"0\",\"5\"",
            long_title
        );
        assert_eq!(content.lines().count(), 200);
        for line in content.lines() {
            assert_eq!(line, expected);
        }
    }
}
