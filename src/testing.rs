//! In-memory stand-ins for the TMDB and Appwrite clients, plus a one-shot
//! local HTTP server for exercising the real ones.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::analytics::{DocumentStore, NewSearchRecord, Query, SearchRecord};
use crate::error::{Error, Result};
use crate::tmdb::{Genre, Movie, MovieDetails, MovieSource};

pub fn movie(id: u64, title: &str) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        overview: String::new(),
        poster_path: Some(format!("/poster-{}.jpg", id)),
        vote_average: 7.0,
        release_date: Some("2005-06-15".to_string()),
        genre_ids: vec![28],
        original_language: Some("en".to_string()),
        popularity: 1.0,
    }
}

pub fn genre(id: u64, name: &str) -> Genre {
    Genre {
        id,
        name: name.to_string(),
    }
}

/// Scripted movie source that counts the calls it receives.
#[derive(Default)]
pub struct FakeSource {
    pub search_results: HashMap<String, Vec<Movie>>,
    pub genre_results: HashMap<u64, Vec<Movie>>,
    pub genres: Vec<Genre>,
    /// Status code returned by every call when set.
    pub fail_status: Option<u16>,
    /// Message returned as a false response by every call when set.
    pub false_response: Option<String>,
    pub movie_calls: AtomicUsize,
    pub genre_calls: AtomicUsize,
}

impl FakeSource {
    fn check(&self) -> Result<()> {
        if let Some(status) = self.fail_status {
            return Err(Error::Http {
                status,
                body: "scripted failure".to_string(),
            });
        }
        if let Some(msg) = &self.false_response {
            return Err(Error::FalseResponse(msg.clone()));
        }
        Ok(())
    }

    pub fn movie_calls(&self) -> usize {
        self.movie_calls.load(Ordering::SeqCst)
    }

    pub fn genre_calls(&self) -> usize {
        self.genre_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl MovieSource for FakeSource {
    async fn movies(&self, query: &str) -> Result<Vec<Movie>> {
        self.movie_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.search_results.get(query).cloned().unwrap_or_default())
    }

    async fn movies_by_genre(&self, genre_id: u64) -> Result<Vec<Movie>> {
        self.genre_calls.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.genre_results.get(&genre_id).cloned().unwrap_or_default())
    }

    async fn genres(&self) -> Result<Vec<Genre>> {
        self.check()?;
        Ok(self.genres.clone())
    }

    async fn movie_details(&self, id: u64) -> Result<MovieDetails> {
        self.check()?;
        Ok(MovieDetails {
            id,
            title: format!("Movie {}", id),
            tagline: None,
            overview: String::new(),
            poster_path: None,
            vote_average: 0.0,
            release_date: None,
            runtime: Some(120),
            original_language: Some("en".to_string()),
            genres: Vec::new(),
            status: Some("Released".to_string()),
            budget: 0,
            revenue: 0,
        })
    }
}

/// Document store backed by a vector, honouring the queries the recorder uses.
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<Vec<SearchRecord>>,
    next_id: AtomicUsize,
    failing: bool,
    stalled: bool,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// A store whose calls never complete, like an unreachable server.
    pub fn stalled() -> Self {
        Self {
            stalled: true,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<SearchRecord> {
        self.records.lock().unwrap().clone()
    }

    async fn check(&self) -> Result<()> {
        if self.stalled {
            std::future::pending::<()>().await;
        }
        if self.failing {
            return Err(Error::Analytics("store unavailable".to_string()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn list_documents(&self, queries: &[Query]) -> Result<Vec<SearchRecord>> {
        self.check().await?;
        let mut docs = self.records();
        let mut limit = None;

        for query in queries {
            match query {
                Query::Equal(attr, value) if attr == "SearchTerm" => {
                    docs.retain(|d| &d.search_term == value);
                }
                Query::OrderDesc(attr) if attr == "count" => {
                    docs.sort_by(|a, b| b.count.cmp(&a.count));
                }
                Query::Limit(n) => limit = Some(*n),
                other => panic!("unsupported query: {:?}", other),
            }
        }

        if let Some(n) = limit {
            docs.truncate(n);
        }
        Ok(docs)
    }

    async fn create_document(&self, record: &NewSearchRecord) -> Result<SearchRecord> {
        self.check().await?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let doc = SearchRecord {
            id: format!("doc-{}", id),
            search_term: record.search_term.clone(),
            count: record.count,
            movie_id: record.movie_id,
            poster_url: record.poster_url.clone(),
        };
        self.records.lock().unwrap().push(doc.clone());
        Ok(doc)
    }

    async fn update_count(&self, document_id: &str, count: u64) -> Result<()> {
        self.check().await?;
        let mut records = self.records.lock().unwrap();
        let doc = records
            .iter_mut()
            .find(|d| d.id == document_id)
            .ok_or_else(|| Error::Analytics(format!("no document {}", document_id)))?;
        doc.count = count;
        Ok(())
    }
}

/// One HTTP request as the local server received it.
#[derive(Debug)]
pub struct CapturedRequest {
    pub head: String,
    pub body: String,
}

impl CapturedRequest {
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }

    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).expect("request body is not JSON")
    }
}

/// Answer a single request on 127.0.0.1 with `status` and a JSON `body`.
///
/// Returns the base URL to point a client at and a handle resolving to the
/// captured request.
pub async fn serve_once(status: u16, body: &str) -> (String, JoinHandle<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let body = body.to_string();

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();

        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        let head_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before the request head");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
        let request = CapturedRequest {
            head,
            body: String::new(),
        };
        let length: usize = request
            .header("content-length")
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        while buf.len() < head_end + length {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before the request body");
            buf.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {} Canned\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        stream.write_all(response.as_bytes()).await.unwrap();
        let _ = stream.shutdown().await;

        CapturedRequest {
            body: String::from_utf8_lossy(&buf[head_end..head_end + length]).into_owned(),
            ..request
        }
    });

    (format!("http://{}", addr), handle)
}
