use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::analytics::{AppwriteClient, SearchAnalytics, SearchRecord};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::tmdb::{Genre, Movie, MovieDetails, MovieSource, TmdbClient};

/// The operations the UI spawns: movie fetches plus the analytics side effect.
pub struct Discovery {
    source: Arc<dyn MovieSource + Send + Sync>,
    analytics: Option<SearchAnalytics>,
    trending_limit: usize,
}

impl Discovery {
    pub fn new(
        source: Arc<dyn MovieSource + Send + Sync>,
        analytics: Option<SearchAnalytics>,
        trending_limit: usize,
    ) -> Self {
        Self {
            source,
            analytics,
            trending_limit,
        }
    }

    /// Wire the real clients. A missing TMDB key is fatal; a broken analytics
    /// setup only disables analytics.
    pub fn from_config(config: &Config) -> Result<Self> {
        let source = TmdbClient::new(&config.tmdb, config.browse.genre_limit)?;

        let analytics = if config.appwrite.is_configured() {
            match AppwriteClient::new(&config.appwrite) {
                Ok(store) => Some(SearchAnalytics::new(
                    Arc::new(store),
                    &config.tmdb.image_base_url,
                )),
                Err(e) => {
                    error!(error = %e, "Failed to set up analytics store");
                    None
                }
            }
        } else {
            warn!("Appwrite not configured, search analytics disabled");
            None
        };

        Ok(Self::new(
            Arc::new(source),
            analytics,
            config.browse.trending_limit,
        ))
    }

    /// Search for `query`, or list popular movies when it is empty.
    pub async fn search(&self, query: &str) -> Result<Vec<Movie>> {
        self.source.movies(query.trim()).await
    }

    /// Count a non-empty search against its first hit. Failures are logged
    /// and dropped; analytics never reaches the UI.
    pub async fn record_search(&self, query: &str, movies: &[Movie]) {
        let term = query.trim();
        let (Some(analytics), Some(first)) = (&self.analytics, movies.first()) else {
            return;
        };
        if term.is_empty() {
            return;
        }
        if let Err(e) = analytics.record_search(term, first).await {
            warn!(term = %term, error = %e, "Failed to record search");
        }
    }

    pub async fn genre_movies(&self, genre_id: u64) -> Result<Vec<Movie>> {
        self.source.movies_by_genre(genre_id).await
    }

    pub async fn genres(&self) -> Result<Vec<Genre>> {
        self.source.genres().await
    }

    pub async fn trending(&self) -> Result<Vec<SearchRecord>> {
        match &self.analytics {
            Some(analytics) => analytics.trending(self.trending_limit).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn details(&self, id: u64) -> Result<MovieDetails> {
        self.source.movie_details(id).await
    }
}

/// The main movie list as the view sees it.
#[derive(Debug, Default)]
pub struct MovieList {
    pub movies: Vec<Movie>,
    pub error: Option<String>,
    pub loading: bool,
}

impl MovieList {
    pub fn start(&mut self) {
        self.loading = true;
        self.error = None;
    }

    /// Last write wins: whichever fetch finishes last owns the list.
    pub fn apply(&mut self, query: &str, result: Result<Vec<Movie>>) {
        self.loading = false;
        match result {
            Ok(movies) => {
                debug!(query = %query, count = movies.len(), "Movies loaded");
                self.movies = movies;
                self.error = None;
            }
            Err(e) => {
                match &e {
                    Error::FalseResponse(msg) => {
                        warn!(query = %query, message = %msg, "API returned false response")
                    }
                    _ => error!(query = %query, error = %e, "Error fetching movies"),
                }
                self.movies.clear();
                self.error = Some(e.user_message());
            }
        }
    }
}
