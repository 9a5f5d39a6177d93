//! Paginated attestation feed client.
//!
//! The remote collection is page-indexed from 1 and reports its total page
//! count on every response. [`PagedFeed`] drains the whole collection one
//! page at a time, strictly sequentially, and either returns every record
//! or fails with the first transport error; a partial fetch is never
//! surfaced to the caller.
//!
//! The HTTP layer sits behind the [`PageTransport`] trait so the drain loop
//! can be exercised against an in-memory transport in tests.

use std::collections::BTreeMap;
use std::time::Duration;

use attestation_models::{AttestationRecord, PageEnvelope};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("attestation endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode page response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One page request as handed to the transport: the endpoint, the fully
/// merged query parameters (caller filters plus `page`), and the optional
/// credential.
#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub base_url: String,
    pub params: BTreeMap<String, String>,
    pub api_key: Option<String>,
}

/// Transport seam between the drain loop and the HTTP stack.
pub trait PageTransport {
    fn fetch_page(&self, request: &PageRequest) -> Result<PageEnvelope, FetchError>;
}

/// Advisory progress sink, notified once per fetched page. Implementations
/// must not influence control flow; the loop ignores anything they do.
pub trait ProgressObserver {
    fn page_fetched(&mut self, page: u64, page_count: u64);
}

/// Observer for callers that do not want progress output.
pub struct NoopObserver;

impl ProgressObserver for NoopObserver {
    fn page_fetched(&mut self, _page: u64, _page_count: u64) {}
}

/// Production transport over a blocking reqwest client.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { client })
    }
}

impl PageTransport for HttpTransport {
    fn fetch_page(&self, request: &PageRequest) -> Result<PageEnvelope, FetchError> {
        let mut req = self
            .client
            .get(&request.base_url)
            .query(&request.params)
            .header(ACCEPT, "application/json");

        // Basic auth with the API key as username and an empty password;
        // unauthenticated when no key was supplied.
        if let Some(ref key) = request.api_key {
            req = req.basic_auth(key, Some(""));
        }

        let resp = req.send()?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().unwrap_or_default();
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp.text()?;
        let envelope: PageEnvelope = serde_json::from_str(&body)?;
        Ok(envelope)
    }
}

/// Caller-side description of what to fetch: endpoint, filter parameters
/// (merged unchanged into every page request), and optional credential.
#[derive(Debug, Clone)]
pub struct FeedQuery {
    pub base_url: String,
    pub params: BTreeMap<String, String>,
    pub api_key: Option<String>,
}

/// Drains a paginated attestation feed into one ordered record collection.
pub struct PagedFeed<T: PageTransport> {
    transport: T,
}

impl<T: PageTransport> PagedFeed<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// Fetch every page of the feed, in page order, and return the
    /// concatenated records.
    ///
    /// `page_count` is re-read from each response rather than cached from
    /// page 1, so a collection that grows mid-fetch is still fully drained.
    /// A `page_count` of 0 on the first page terminates after one request.
    pub fn fetch_all(
        &self,
        query: &FeedQuery,
        observer: &mut dyn ProgressObserver,
    ) -> Result<Vec<AttestationRecord>, FetchError> {
        let mut accumulated = Vec::new();
        let mut page: u64 = 1;

        loop {
            let mut params = query.params.clone();
            params.insert("page".to_string(), page.to_string());

            let request = PageRequest {
                base_url: query.base_url.clone(),
                params,
                api_key: query.api_key.clone(),
            };

            let envelope = self.transport.fetch_page(&request)?;
            let page_count = envelope.pagination.page_count;
            debug!(
                "fetched page {page}/{page_count} ({} records)",
                envelope.data.len()
            );

            accumulated.extend(envelope.data);
            observer.page_fetched(page, page_count);

            if page >= page_count {
                break;
            }
            page += 1;
        }

        Ok(accumulated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use attestation_models::Pagination;
    use std::cell::RefCell;

    fn record(name: &str, created_at: i64) -> AttestationRecord {
        AttestationRecord {
            created_at,
            is_compliant: Some(true),
            attestation_name: name.to_string(),
            annotations: Default::default(),
            git_commit_info: Default::default(),
            extra: Default::default(),
        }
    }

    fn page(records: Vec<AttestationRecord>, page_count: u64) -> PageEnvelope {
        PageEnvelope {
            data: records,
            pagination: Pagination {
                page_count,
                extra: Default::default(),
            },
        }
    }

    /// Serves canned pages in order and records every request it sees.
    struct MemoryTransport {
        pages: Vec<Result<PageEnvelope, FetchError>>,
        seen: RefCell<Vec<PageRequest>>,
    }

    impl MemoryTransport {
        fn new(pages: Vec<Result<PageEnvelope, FetchError>>) -> Self {
            Self {
                pages,
                seen: RefCell::new(Vec::new()),
            }
        }
    }

    impl PageTransport for MemoryTransport {
        fn fetch_page(&self, request: &PageRequest) -> Result<PageEnvelope, FetchError> {
            let mut seen = self.seen.borrow_mut();
            seen.push(request.clone());
            match &self.pages[seen.len() - 1] {
                Ok(envelope) => Ok(envelope.clone()),
                Err(FetchError::Status { status, body }) => Err(FetchError::Status {
                    status: *status,
                    body: body.clone(),
                }),
                Err(_) => unreachable!("tests only fail with Status"),
            }
        }
    }

    struct CountingObserver {
        calls: Vec<(u64, u64)>,
    }

    impl ProgressObserver for CountingObserver {
        fn page_fetched(&mut self, page: u64, page_count: u64) {
            self.calls.push((page, page_count));
        }
    }

    fn query() -> FeedQuery {
        FeedQuery {
            base_url: "https://api.test/attestations/acme/backend".to_string(),
            params: BTreeMap::new(),
            api_key: None,
        }
    }

    #[test]
    fn drains_all_pages_in_order() {
        let transport = MemoryTransport::new(vec![
            Ok(page(vec![record("a", 1), record("a", 2)], 3)),
            Ok(page(vec![record("a", 3)], 3)),
            Ok(page(vec![record("a", 4)], 3)),
        ]);
        let feed = PagedFeed::new(transport);

        let records = feed.fetch_all(&query(), &mut NoopObserver).unwrap();

        let created: Vec<i64> = records.iter().map(|r| r.created_at).collect();
        assert_eq!(created, vec![1, 2, 3, 4]);
        assert_eq!(feed.transport.seen.borrow().len(), 3);
    }

    #[test]
    fn zero_page_count_stops_after_one_request() {
        let transport = MemoryTransport::new(vec![Ok(page(vec![record("a", 1)], 0))]);
        let feed = PagedFeed::new(transport);

        let records = feed.fetch_all(&query(), &mut NoopObserver).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(feed.transport.seen.borrow().len(), 1);
    }

    #[test]
    fn single_page_feed_stops_after_one_request() {
        let transport = MemoryTransport::new(vec![Ok(page(vec![], 1))]);
        let feed = PagedFeed::new(transport);

        let records = feed.fetch_all(&query(), &mut NoopObserver).unwrap();

        assert!(records.is_empty());
        assert_eq!(feed.transport.seen.borrow().len(), 1);
    }

    #[test]
    fn merges_caller_params_with_page_number() {
        let transport = MemoryTransport::new(vec![
            Ok(page(vec![], 2)),
            Ok(page(vec![], 2)),
        ]);
        let feed = PagedFeed::new(transport);

        let mut q = query();
        q.params
            .insert("from_timestamp".to_string(), "100".to_string());
        q.params.insert("to_timestamp".to_string(), "200".to_string());

        feed.fetch_all(&q, &mut NoopObserver).unwrap();

        let seen = feed.transport.seen.borrow();
        for (i, req) in seen.iter().enumerate() {
            assert_eq!(req.params.get("from_timestamp").unwrap(), "100");
            assert_eq!(req.params.get("to_timestamp").unwrap(), "200");
            assert_eq!(req.params.get("page").unwrap(), &(i + 1).to_string());
            assert_eq!(req.params.len(), 3);
        }
        // Caller params never mutate across requests.
        assert_eq!(q.params.len(), 2);
    }

    #[test]
    fn api_key_rides_along_on_every_request() {
        let transport = MemoryTransport::new(vec![
            Ok(page(vec![], 2)),
            Ok(page(vec![], 2)),
        ]);
        let feed = PagedFeed::new(transport);

        let mut q = query();
        q.api_key = Some("secret".to_string());
        feed.fetch_all(&q, &mut NoopObserver).unwrap();

        for req in feed.transport.seen.borrow().iter() {
            assert_eq!(req.api_key.as_deref(), Some("secret"));
        }
    }

    #[test]
    fn no_api_key_means_no_credential_on_any_request() {
        let transport = MemoryTransport::new(vec![Ok(page(vec![], 1))]);
        let feed = PagedFeed::new(transport);

        feed.fetch_all(&query(), &mut NoopObserver).unwrap();

        for req in feed.transport.seen.borrow().iter() {
            assert!(req.api_key.is_none());
        }
    }

    #[test]
    fn transport_error_aborts_without_partial_result() {
        let transport = MemoryTransport::new(vec![
            Ok(page(vec![record("a", 1)], 3)),
            Err(FetchError::Status {
                status: 503,
                body: "upstream unavailable".to_string(),
            }),
        ]);
        let feed = PagedFeed::new(transport);

        let err = feed.fetch_all(&query(), &mut NoopObserver).unwrap_err();
        match err {
            FetchError::Status { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "upstream unavailable");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn growing_page_count_is_fully_drained() {
        // Server learns about a third page while we fetch the second.
        let transport = MemoryTransport::new(vec![
            Ok(page(vec![record("a", 1)], 2)),
            Ok(page(vec![record("a", 2)], 3)),
            Ok(page(vec![record("a", 3)], 3)),
        ]);
        let feed = PagedFeed::new(transport);

        let records = feed.fetch_all(&query(), &mut NoopObserver).unwrap();
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn observer_sees_every_page_and_nothing_more() {
        let transport = MemoryTransport::new(vec![
            Ok(page(vec![], 2)),
            Ok(page(vec![], 2)),
        ]);
        let feed = PagedFeed::new(transport);

        let mut observer = CountingObserver { calls: Vec::new() };
        feed.fetch_all(&query(), &mut observer).unwrap();

        assert_eq!(observer.calls, vec![(1, 2), (2, 2)]);
    }
}
