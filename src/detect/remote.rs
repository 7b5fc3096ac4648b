//! HTTP-backed detectors
//!
//! Each adapter POSTs JSON to a model service and expects:
//!
//! | Adapter | Request | Response |
//! |---------|---------|----------|
//! | [`HttpEntityDetector`] | `{"text": ...}` | `[{"label", "start", "end"}]` |
//! | [`HttpTokenClassifier`] | `{"text": ...}` | `[{"entity", "start", "end", "score"}]` |
//! | [`HttpSynonymSource`] | `{"term": ...}` | `["form", ...]` |
//!
//! Services report *character* offsets; they are converted to byte offsets
//! here. Entities whose offsets do not fit the text are dropped.

use super::text::CharIndex;
use super::{DetectorError, DetectorResult, EntityDetector, SynonymSource, TokenClassifier};
use crate::error::Result;
use crate::span::{RawEntity, ScoredEntity};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::time::Duration;

#[derive(Serialize)]
struct TextRequest<'a> {
    text: &'a str,
}

#[derive(Serialize)]
struct TermRequest<'a> {
    term: &'a str,
}

/// Shared blocking JSON client
struct JsonEndpoint {
    client: Client,
    endpoint: String,
}

impl JsonEndpoint {
    fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
        })
    }

    fn post<B: Serialize, T: DeserializeOwned>(&self, body: &B) -> DetectorResult<T> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(body)
            .send()
            .map_err(|e| DetectorError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DetectorError::Unavailable(format!(
                "{} returned {}",
                self.endpoint, status
            )));
        }

        let body = response
            .text()
            .map_err(|e| DetectorError::Request(e.to_string()))?;
        decode(&body)
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> DetectorResult<T> {
    serde_json::from_str(body).map_err(|e| DetectorError::Malformed(e.to_string()))
}

/// Map character offsets to byte offsets, dropping entities that do not fit.
fn to_byte_range(index: &CharIndex, start: usize, end: usize) -> Option<(usize, usize)> {
    match (index.byte_offset(start), index.byte_offset(end)) {
        (Some(s), Some(e)) => Some((s, e)),
        _ => {
            tracing::debug!(start, end, "Dropping entity with out-of-range offsets");
            None
        }
    }
}

/// Statistical NER served over HTTP
pub struct HttpEntityDetector {
    inner: JsonEndpoint,
}

impl HttpEntityDetector {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            inner: JsonEndpoint::new(endpoint, timeout)?,
        })
    }
}

impl EntityDetector for HttpEntityDetector {
    fn detect(&self, text: &str) -> DetectorResult<Vec<RawEntity>> {
        let entities: Vec<RawEntity> = self.inner.post(&TextRequest { text })?;
        let index = CharIndex::new(text);
        Ok(entities
            .into_iter()
            .filter_map(|e| {
                let (start, end) = to_byte_range(&index, e.start, e.end)?;
                Some(RawEntity::new(e.label, start, end))
            })
            .collect())
    }

    fn name(&self) -> &str {
        &self.inner.endpoint
    }
}

/// Transformer token classifier served over HTTP
pub struct HttpTokenClassifier {
    inner: JsonEndpoint,
}

impl HttpTokenClassifier {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            inner: JsonEndpoint::new(endpoint, timeout)?,
        })
    }
}

impl TokenClassifier for HttpTokenClassifier {
    fn classify(&self, text: &str) -> DetectorResult<Vec<ScoredEntity>> {
        let entities: Vec<ScoredEntity> = self.inner.post(&TextRequest { text })?;
        let index = CharIndex::new(text);
        Ok(entities
            .into_iter()
            .filter_map(|e| {
                let (start, end) = to_byte_range(&index, e.start, e.end)?;
                Some(ScoredEntity::new(e.label, start, end, e.score))
            })
            .collect())
    }

    fn name(&self) -> &str {
        &self.inner.endpoint
    }
}

/// Synonym service served over HTTP
pub struct HttpSynonymSource {
    inner: JsonEndpoint,
}

impl HttpSynonymSource {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            inner: JsonEndpoint::new(endpoint, timeout)?,
        })
    }
}

impl SynonymSource for HttpSynonymSource {
    fn synonyms(&self, term: &str) -> DetectorResult<HashSet<String>> {
        let forms: Vec<String> = self.inner.post(&TermRequest { term })?;
        Ok(forms
            .into_iter()
            .map(|f| f.replace('_', " ").to_lowercase())
            .collect())
    }

    fn name(&self) -> &str {
        &self.inner.endpoint
    }
}
