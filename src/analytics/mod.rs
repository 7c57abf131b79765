use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::tmdb::Movie;

pub mod appwrite;

pub use appwrite::AppwriteClient;

const TERM_ATTRIBUTE: &str = "SearchTerm";
const COUNT_ATTRIBUTE: &str = "count";

/// A stored search-popularity document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "SearchTerm")]
    pub search_term: String,
    pub count: u64,
    pub movie_id: u64,
    #[serde(default)]
    pub poster_url: String,
}

/// Document body for a record that does not exist yet.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewSearchRecord {
    #[serde(rename = "SearchTerm")]
    pub search_term: String,
    pub count: u64,
    pub movie_id: u64,
    pub poster_url: String,
}

/// Filters understood by the document store's list call.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Equal(String, String),
    OrderDesc(String),
    Limit(usize),
}

impl Query {
    pub fn equal(attribute: &str, value: &str) -> Self {
        Query::Equal(attribute.to_string(), value.to_string())
    }

    pub fn order_desc(attribute: &str) -> Self {
        Query::OrderDesc(attribute.to_string())
    }

    /// Appwrite's JSON query syntax.
    pub fn to_json(&self) -> String {
        let value = match self {
            Query::Equal(attr, value) => serde_json::json!({
                "method": "equal",
                "attribute": attr,
                "values": [value],
            }),
            Query::OrderDesc(attr) => serde_json::json!({
                "method": "orderDesc",
                "attribute": attr,
            }),
            Query::Limit(n) => serde_json::json!({
                "method": "limit",
                "values": [n],
            }),
        };
        value.to_string()
    }
}

#[async_trait::async_trait]
pub trait DocumentStore {
    async fn list_documents(&self, queries: &[Query]) -> Result<Vec<SearchRecord>>;
    async fn create_document(&self, record: &NewSearchRecord) -> Result<SearchRecord>;
    async fn update_count(&self, document_id: &str, count: u64) -> Result<()>;
}

/// Upserts one counter document per distinct search term.
///
/// Lookup and write are two separate calls, so two identical searches racing
/// each other can both miss and create duplicate records.
#[derive(Clone)]
pub struct SearchAnalytics {
    store: Arc<dyn DocumentStore + Send + Sync>,
    image_base_url: String,
}

impl SearchAnalytics {
    pub fn new(store: Arc<dyn DocumentStore + Send + Sync>, image_base_url: &str) -> Self {
        Self {
            store,
            image_base_url: image_base_url.to_string(),
        }
    }

    pub fn poster_url(&self, movie: &Movie) -> String {
        match &movie.poster_path {
            Some(path) => format!("{}{}", self.image_base_url, path),
            None => String::new(),
        }
    }

    pub async fn record_search(&self, term: &str, movie: &Movie) -> Result<()> {
        let existing = self
            .store
            .list_documents(&[Query::equal(TERM_ATTRIBUTE, term)])
            .await?;

        if let Some(doc) = existing.into_iter().next() {
            let count = doc.count + 1;
            self.store.update_count(&doc.id, count).await?;
            debug!(term = %term, count, "Incremented search count");
        } else {
            let record = NewSearchRecord {
                search_term: term.to_string(),
                count: 1,
                movie_id: movie.id,
                poster_url: self.poster_url(movie),
            };
            self.store.create_document(&record).await?;
            info!(term = %term, movie_id = movie.id, "Created search record");
        }

        Ok(())
    }

    /// Most searched terms, highest count first.
    pub async fn trending(&self, limit: usize) -> Result<Vec<SearchRecord>> {
        let mut records = self
            .store
            .list_documents(&[Query::Limit(limit), Query::order_desc(COUNT_ATTRIBUTE)])
            .await?;
        records.sort_by(|a, b| b.count.cmp(&a.count));
        records.truncate(limit);
        Ok(records)
    }
}
