use reqwest::{Client, RequestBuilder, Response, header};
use serde::Deserialize;
use tracing::debug;

use crate::analytics::{DocumentStore, NewSearchRecord, Query, SearchRecord};
use crate::config::AppwriteConfig;
use crate::error::{Error, Result};

/// Lets the server pick the document id.
const UNIQUE_ID: &str = "unique()";

pub struct AppwriteClient {
    client: Client,
    documents_url: String,
}

#[derive(Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<SearchRecord>,
}

impl AppwriteClient {
    pub fn new(config: &AppwriteConfig) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            "x-appwrite-project",
            header::HeaderValue::from_str(&config.project_id)
                .map_err(|e| Error::Analytics(format!("Invalid project id: {}", e)))?,
        );
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            let mut value = header::HeaderValue::from_str(key)
                .map_err(|e| Error::Analytics(format!("Invalid API key: {}", e)))?;
            value.set_sensitive(true);
            headers.insert("x-appwrite-key", value);
        }

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            documents_url: documents_url(config),
        })
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Analytics(format!("{} - {}", status, body)));
        }
        Ok(response)
    }
}

fn documents_url(config: &AppwriteConfig) -> String {
    format!(
        "{}/databases/{}/collections/{}/documents",
        config.endpoint.trim_end_matches('/'),
        urlencoding::encode(&config.database_id),
        urlencoding::encode(&config.collection_id),
    )
}

#[async_trait::async_trait]
impl DocumentStore for AppwriteClient {
    async fn list_documents(&self, queries: &[Query]) -> Result<Vec<SearchRecord>> {
        let params: Vec<(&str, String)> = queries.iter().map(|q| ("queries[]", q.to_json())).collect();
        debug!(queries = params.len(), "Listing documents");

        let response = self
            .send(self.client.get(&self.documents_url).query(&params))
            .await?;
        let list: DocumentList = response.json().await?;
        Ok(list.documents)
    }

    async fn create_document(&self, record: &NewSearchRecord) -> Result<SearchRecord> {
        let body = serde_json::json!({
            "documentId": UNIQUE_ID,
            "data": record,
        });

        let response = self
            .send(self.client.post(&self.documents_url).json(&body))
            .await?;
        Ok(response.json().await?)
    }

    async fn update_count(&self, document_id: &str, count: u64) -> Result<()> {
        let url = format!("{}/{}", self.documents_url, urlencoding::encode(document_id));
        let body = serde_json::json!({ "data": { "count": count } });

        self.send(self.client.patch(&url).json(&body)).await?;
        Ok(())
    }
}
