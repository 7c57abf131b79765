use std::collections::{HashMap, HashSet};

use crate::tmdb::{Genre, Movie};

/// Per-session genre browsing state.
///
/// Entries are write-once: a genre that has been filled is never fetched
/// again, and nothing is evicted.
#[derive(Debug, Default)]
pub struct GenreCache {
    limit: usize,
    entries: HashMap<u64, Vec<Movie>>,
    in_flight: HashSet<u64>,
    selected: Option<Genre>,
}

impl GenreCache {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// Make `genre` the selected one. Returns true when the caller should
    /// start a fetch for it.
    pub fn select(&mut self, genre: Genre) -> bool {
        let id = genre.id;
        self.selected = Some(genre);

        if self.entries.contains_key(&id) || self.in_flight.contains(&id) {
            return false;
        }
        self.in_flight.insert(id);
        true
    }

    /// Store a fetched list. An id that is already filled keeps its first list.
    pub fn fill(&mut self, genre_id: u64, mut movies: Vec<Movie>) {
        self.in_flight.remove(&genre_id);
        movies.truncate(self.limit);
        self.entries.entry(genre_id).or_insert(movies);
    }

    /// Forget an in-flight fetch so the next selection retries.
    pub fn fail(&mut self, genre_id: u64) {
        self.in_flight.remove(&genre_id);
    }

    pub fn selected(&self) -> Option<&Genre> {
        self.selected.as_ref()
    }

    pub fn get(&self, genre_id: u64) -> Option<&[Movie]> {
        self.entries.get(&genre_id).map(Vec::as_slice)
    }

    /// Movies for the selected genre, empty while it is still loading.
    pub fn selected_movies(&self) -> &[Movie] {
        self.selected
            .as_ref()
            .and_then(|g| self.get(g.id))
            .unwrap_or(&[])
    }

    pub fn is_loading(&self) -> bool {
        self.selected
            .as_ref()
            .is_some_and(|g| self.in_flight.contains(&g.id))
    }
}

/// Pick the configured default genre by exact name.
pub fn default_genre<'a>(genres: &'a [Genre], name: &str) -> Option<&'a Genre> {
    genres.iter().find(|g| g.name == name)
}
