use reqwest::{Client, header};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::TmdbConfig;
use crate::error::{Error, Result};
use crate::tmdb::{Genre, Movie, MovieDetails, MovieSource};

const DEFAULT_FALSE_MESSAGE: &str = "Failed to fetch movies";

pub struct TmdbClient {
    client: Client,
    base_url: String,
    language: String,
    genre_limit: usize,
}

#[derive(Debug, Deserialize)]
struct MoviePage {
    #[serde(default)]
    results: Vec<Movie>,
}

#[derive(Deserialize)]
struct GenreList {
    #[serde(default)]
    genres: Vec<Genre>,
}

impl TmdbClient {
    pub fn new(config: &TmdbConfig, genre_limit: usize) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(Error::MissingApiKey);
        }

        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );
        let mut auth = header::HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| Error::MissingApiKey)?;
        auth.set_sensitive(true);
        headers.insert(header::AUTHORIZATION, auth);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            genre_limit,
        })
    }

    async fn get<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "TMDB request");

        let response = self.client.get(&url).query(query).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        decode_body(&body)
    }
}

/// Decode a 2xx body, treating `{"Response": "False"}` as an application error.
fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T> {
    let value: serde_json::Value = serde_json::from_str(body)?;

    if value.get("Response").and_then(|r| r.as_str()) == Some("False") {
        let message = value
            .get("Error")
            .and_then(|e| e.as_str())
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_FALSE_MESSAGE);
        return Err(Error::FalseResponse(message.to_string()));
    }

    Ok(serde_json::from_value(value)?)
}

#[async_trait::async_trait]
impl MovieSource for TmdbClient {
    async fn movies(&self, query: &str) -> Result<Vec<Movie>> {
        let page: MoviePage = if query.is_empty() {
            self.get(
                "/discover/movie",
                &[("sort_by", "popularity.desc".to_string())],
            )
            .await?
        } else {
            self.get("/search/movie", &[("query", query.to_string())])
                .await?
        };
        Ok(page.results)
    }

    async fn movies_by_genre(&self, genre_id: u64) -> Result<Vec<Movie>> {
        let page: MoviePage = self
            .get(
                "/discover/movie",
                &[
                    ("with_genres", genre_id.to_string()),
                    ("sort_by", "popularity.desc".to_string()),
                ],
            )
            .await?;

        let mut results = page.results;
        results.truncate(self.genre_limit);
        Ok(results)
    }

    async fn genres(&self) -> Result<Vec<Genre>> {
        let list: GenreList = self
            .get("/genre/movie/list", &[("language", self.language.clone())])
            .await?;
        Ok(list.genres)
    }

    async fn movie_details(&self, id: u64) -> Result<MovieDetails> {
        self.get(&format!("/movie/{}", id), &[]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FETCH_FAILED_MESSAGE;
    use crate::testing::serve_once;

    fn client_for(base_url: String) -> TmdbClient {
        let config = TmdbConfig {
            api_key: "test-token".to_string(),
            base_url,
            ..TmdbConfig::default()
        };
        TmdbClient::new(&config, 12).unwrap()
    }

    fn page_of(count: u64) -> String {
        let results: Vec<_> = (1..=count)
            .map(|id| serde_json::json!({ "id": id, "title": format!("Movie {}", id) }))
            .collect();
        serde_json::json!({ "page": 1, "results": results }).to_string()
    }

    #[test]
    fn test_decode_results_page() {
        let body = r#"{
            "page": 1,
            "results": [
                {"id": 268, "title": "Batman", "poster_path": "/b.jpg", "vote_average": 7.2,
                 "release_date": "1989-06-23", "genre_ids": [14, 28]},
                {"id": 272, "title": "Batman Begins"}
            ],
            "total_pages": 1
        }"#;

        let page: MoviePage = decode_body(body).unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].poster_path.as_deref(), Some("/b.jpg"));
        assert_eq!(page.results[1].title, "Batman Begins");
    }

    #[test]
    fn test_false_response_with_message() {
        let body = r#"{"Response": "False", "Error": "Too many results."}"#;
        let err = decode_body::<MoviePage>(body).unwrap_err();
        assert!(matches!(err, Error::FalseResponse(ref m) if m == "Too many results."));
    }

    #[test]
    fn test_false_response_without_message() {
        let err = decode_body::<MoviePage>(r#"{"Response": "False"}"#).unwrap_err();
        assert_eq!(err.user_message(), DEFAULT_FALSE_MESSAGE);
    }

    #[test]
    fn test_missing_results_is_empty() {
        let page: MoviePage = decode_body(r#"{"page": 1}"#).unwrap();
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_garbage_body_is_decode_error() {
        let err = decode_body::<MoviePage>("<html>").unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_new_requires_api_key() {
        let config = TmdbConfig::default();
        assert!(matches!(
            TmdbClient::new(&config, 12),
            Err(Error::MissingApiKey)
        ));
    }

    #[test]
    fn test_decode_genres_and_details() {
        let list: GenreList =
            decode_body(r#"{"genres": [{"id": 28, "name": "Action"}, {"id": 35, "name": "Comedy"}]}"#)
                .unwrap();
        assert_eq!(list.genres[0], Genre { id: 28, name: "Action".to_string() });

        let details: MovieDetails = decode_body(
            r#"{"id": 155, "title": "The Dark Knight", "tagline": "Why so serious?",
                "runtime": 152, "budget": 185000000, "revenue": 1004558444,
                "status": "Released", "original_language": "en",
                "genres": [{"id": 18, "name": "Drama"}, {"id": 28, "name": "Action"}]}"#,
        )
        .unwrap();
        assert_eq!(details.runtime, Some(152));
        assert_eq!(details.genre_names(), "Drama, Action");
    }

    #[tokio::test]
    async fn test_search_request_and_headers() {
        let (url, server) = serve_once(200, &page_of(2)).await;
        let client = client_for(url);

        let movies = client.movies("batman").await.unwrap();
        assert_eq!(movies.len(), 2);

        let request = server.await.unwrap();
        assert_eq!(request.request_line(), "GET /search/movie?query=batman HTTP/1.1");
        assert_eq!(request.header("authorization"), Some("Bearer test-token"));
        assert_eq!(request.header("accept"), Some("application/json"));
    }

    #[tokio::test]
    async fn test_empty_query_discovers_popular() {
        let (url, server) = serve_once(200, &page_of(3)).await;
        let client = client_for(url);

        assert_eq!(client.movies("").await.unwrap().len(), 3);

        let request = server.await.unwrap();
        assert_eq!(
            request.request_line(),
            "GET /discover/movie?sort_by=popularity.desc HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_genre_page_is_truncated() {
        let (url, server) = serve_once(200, &page_of(14)).await;
        let client = client_for(url);

        let movies = client.movies_by_genre(28).await.unwrap();
        assert_eq!(movies.len(), 12);
        assert_eq!(movies[0].id, 1);

        let request = server.await.unwrap();
        assert_eq!(
            request.request_line(),
            "GET /discover/movie?with_genres=28&sort_by=popularity.desc HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_genre_list_and_details_paths() {
        let (url, server) = serve_once(200, r#"{"genres": [{"id": 28, "name": "Action"}]}"#).await;
        let genres = client_for(url).genres().await.unwrap();
        assert_eq!(genres.len(), 1);
        let request = server.await.unwrap();
        assert_eq!(request.request_line(), "GET /genre/movie/list?language=en HTTP/1.1");

        let (url, server) = serve_once(200, r#"{"id": 155, "title": "The Dark Knight"}"#).await;
        let details = client_for(url).movie_details(155).await.unwrap();
        assert_eq!(details.title, "The Dark Knight");
        let request = server.await.unwrap();
        assert_eq!(request.request_line(), "GET /movie/155 HTTP/1.1");
    }

    #[tokio::test]
    async fn test_server_error_is_http_error() {
        let (url, server) = serve_once(500, r#"{"status_message": "Internal error"}"#).await;
        let client = client_for(url);

        let err = client.movies("batman").await.unwrap_err();
        assert!(matches!(err, Error::Http { status: 500, ref body } if body.contains("Internal error")));
        assert_eq!(err.user_message(), FETCH_FAILED_MESSAGE);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unauthorized_is_http_error() {
        // A valid JSON body that would otherwise decode as an empty page
        let (url, server) = serve_once(
            401,
            r#"{"status_code": 7, "status_message": "Invalid API key", "success": false}"#,
        )
        .await;
        let client = client_for(url);

        let err = client.movies_by_genre(28).await.unwrap_err();
        assert!(matches!(err, Error::Http { status: 401, .. }));
        assert_eq!(err.user_message(), FETCH_FAILED_MESSAGE);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_false_response_over_http() {
        let (url, server) = serve_once(200, r#"{"Response": "False", "Error": "Movie not found!"}"#).await;

        let err = client_for(url).movies("qqq").await.unwrap_err();
        assert_eq!(err.user_message(), "Movie not found!");
        server.await.unwrap();
    }
}
