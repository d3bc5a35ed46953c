//! `indexnow` task: submit changed URLs to an IndexNow endpoint.
//!
//! URLs come from the options directly or from a newline-delimited file;
//! submission is batched, with an optional counted retry per batch. The
//! HTTP side sits behind `Submitter` so batching and retry semantics are
//! testable offline.

use super::{TaskError, TaskOutcome, reports};
use serde::Deserialize;
use serde_json::{Value, json};
use std::{fs, path::Path, path::PathBuf};

pub const DEFAULT_ENDPOINT: &str = "https://api.indexnow.org/indexnow";

#[derive(Debug, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct IndexNowOptions {
    /// Site host, e.g. `docs.example.com`.
    #[serde(alias = "base-url", alias = "baseUrl")]
    pub host: Option<String>,

    /// IndexNow key, inline.
    pub key: Option<String>,

    /// Path to a file whose trimmed contents are the key.
    #[serde(alias = "key-file")]
    pub key_file: Option<PathBuf>,

    /// URLs to submit, inline.
    pub urls: Vec<String>,

    /// Newline-delimited URL list file, relative to the site root.
    #[serde(alias = "url-file")]
    pub url_file: Option<PathBuf>,

    /// Submission endpoint.
    pub endpoint: String,

    /// URLs per request.
    #[serde(alias = "batch-size")]
    pub batch_size: usize,

    /// Extra attempts per batch after the first; 0 disables retry.
    pub retries: usize,

    /// Plan batches without submitting.
    #[serde(alias = "dry-run")]
    pub dry_run: bool,

    /// Write `_reports/indexnow.json` under the site root.
    pub report: bool,
}

impl Default for IndexNowOptions {
    fn default() -> Self {
        Self {
            host: None,
            key: None,
            key_file: None,
            urls: Vec::new(),
            url_file: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            batch_size: 100,
            retries: 0,
            dry_run: false,
            report: false,
        }
    }
}

/// One POST of a URL batch. Returns the HTTP status, or a transport error.
pub trait Submitter {
    fn submit(&self, endpoint: &str, body: &Value) -> Result<u16, String>;
}

/// reqwest-backed submitter used outside tests.
pub struct HttpSubmitter {
    client: reqwest::blocking::Client,
}

impl HttpSubmitter {
    pub fn new() -> Result<Self, TaskError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("sitewright/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TaskError::Network(format!("http client: {e}")))?;
        Ok(Self { client })
    }
}

impl Submitter for HttpSubmitter {
    fn submit(&self, endpoint: &str, body: &Value) -> Result<u16, String> {
        let response = self
            .client
            .post(endpoint)
            .json(body)
            .send()
            .map_err(|e| format!("{e}"))?;
        Ok(response.status().as_u16())
    }
}

pub fn run(
    root: &Path,
    opts: &IndexNowOptions,
    submitter: &dyn Submitter,
) -> Result<TaskOutcome, TaskError> {
    let host = opts
        .host
        .as_deref()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| TaskError::Options("indexnow requires a host".to_string()))?;
    let key = resolve_key(root, opts)?;
    if opts.batch_size == 0 {
        return Err(TaskError::Options("batchSize must be at least 1".to_string()));
    }

    let mut urls = opts.urls.clone();
    if let Some(url_file) = &opts.url_file {
        let path = root.join(url_file);
        let raw = fs::read_to_string(&path)
            .map_err(|e| TaskError::Options(format!("read urlFile `{}`: {e}", path.display())))?;
        urls.extend(
            raw.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from),
        );
    }
    urls.sort();
    urls.dedup();

    let batches: Vec<&[String]> = urls.chunks(opts.batch_size).collect();
    let mut submitted = 0usize;

    if !opts.dry_run {
        for batch in &batches {
            let body = json!({
                "host": host,
                "key": key,
                "urlList": batch,
            });
            submit_with_retry(submitter, &opts.endpoint, &body, opts.retries)?;
            submitted += batch.len();
        }
    }

    let payload = json!({
        "host": host,
        "endpoint": opts.endpoint,
        "urls": urls.len(),
        "batches": batches.len(),
        "submitted": submitted,
        "dryRun": opts.dry_run,
    });
    if opts.report {
        reports::write_json(root, "indexnow", &payload)?;
    }

    let message = if opts.dry_run {
        format!("dry run: {} url(s) in {} batch(es)", urls.len(), batches.len())
    } else {
        format!("submitted {submitted} url(s) in {} batch(es)", batches.len())
    };
    Ok(TaskOutcome { message, payload })
}

fn resolve_key(root: &Path, opts: &IndexNowOptions) -> Result<String, TaskError> {
    if let Some(key) = opts.key.as_deref().filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }
    if let Some(key_file) = &opts.key_file {
        let path = root.join(key_file);
        let raw = fs::read_to_string(&path)
            .map_err(|e| TaskError::Options(format!("read keyFile `{}`: {e}", path.display())))?;
        let key = raw.trim();
        if !key.is_empty() {
            return Ok(key.to_string());
        }
    }
    Err(TaskError::Options("indexnow requires a key or keyFile".to_string()))
}

/// One batch: `retries + 1` attempts, failing with the last error.
fn submit_with_retry(
    submitter: &dyn Submitter,
    endpoint: &str,
    body: &Value,
    retries: usize,
) -> Result<(), TaskError> {
    let mut last_error = String::new();
    for _ in 0..=retries {
        match submitter.submit(endpoint, body) {
            Ok(status) if (200..300).contains(&status) => return Ok(()),
            Ok(status) => last_error = format!("endpoint returned status {status}"),
            Err(e) => last_error = e,
        }
    }
    Err(TaskError::Network(format!("indexnow submission failed: {last_error}")))
}
