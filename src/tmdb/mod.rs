use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub mod client;

pub use client::TmdbClient;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub popularity: f64,
}

impl Movie {
    /// TMDB sends `""` for unknown release dates, so parse rather than slice.
    pub fn release_year(&self) -> Option<i32> {
        use chrono::Datelike;
        release_date(self.release_date.as_deref()).map(|d| d.year())
    }

    pub fn rating_display(&self) -> String {
        format_rating(self.vote_average)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieDetails {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub original_language: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub budget: u64,
    #[serde(default)]
    pub revenue: u64,
}

impl MovieDetails {
    pub fn genre_names(&self) -> String {
        self.genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn release_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

pub fn format_rating(vote_average: f64) -> String {
    if vote_average > 0.0 {
        format!("{:.1}", vote_average)
    } else {
        "N/A".to_string()
    }
}

/// Group digits with commas: 160000000 -> "160,000,000".
pub fn format_money(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[async_trait::async_trait]
pub trait MovieSource {
    /// Text search when `query` is non-empty, popularity discover otherwise.
    async fn movies(&self, query: &str) -> Result<Vec<Movie>>;
    async fn movies_by_genre(&self, genre_id: u64) -> Result<Vec<Movie>>;
    async fn genres(&self) -> Result<Vec<Genre>>;
    async fn movie_details(&self, id: u64) -> Result<MovieDetails>;
}
