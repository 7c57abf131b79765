use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::Color,
    widgets::ListState,
};
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::analytics::SearchRecord;
use crate::config::Config;
use crate::debounce::Debouncer;
use crate::discovery::{Discovery, MovieList};
use crate::error::Result;
use crate::genre_cache::{self, GenreCache};
use crate::tmdb::{Genre, Movie, MovieDetails};
use crate::ui::{
    render_detail_view, render_genre_bar, render_movie_list, render_search_input,
    render_trending_rail, widgets,
};

const TICK: Duration = Duration::from_millis(100);
const DETAIL_FAILED_MESSAGE: &str = "Failed to load movie. Please try again later.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Browse,
    Detail,
    Help,
}

/// Which pane of the browse view receives keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Trending,
    Genres,
    Results,
    GenreMovies,
}

impl Focus {
    pub fn next(&self) -> Self {
        match self {
            Focus::Search => Focus::Trending,
            Focus::Trending => Focus::Genres,
            Focus::Genres => Focus::Results,
            Focus::Results => Focus::GenreMovies,
            Focus::GenreMovies => Focus::Search,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Focus::Search => Focus::GenreMovies,
            Focus::Trending => Focus::Search,
            Focus::Genres => Focus::Trending,
            Focus::Results => Focus::Genres,
            Focus::GenreMovies => Focus::Results,
        }
    }
}

#[derive(Debug, Default)]
pub struct DetailState {
    pub movie_id: u64,
    pub details: Option<MovieDetails>,
    pub error: Option<String>,
}

pub enum AppMessage {
    Movies {
        query: String,
        result: Result<Vec<Movie>>,
    },
    Genres(Vec<Genre>),
    GenresError(String),
    GenreMovies(u64, Vec<Movie>),
    GenreError(u64, String),
    Trending(Vec<SearchRecord>),
    TrendingError(String),
    Details(u64, MovieDetails),
    DetailsError(u64, String),
}

pub struct App {
    pub running: bool,
    pub view: View,
    pub previous_view: View,
    pub focus: Focus,
    pub accent: Color,
    image_base_url: String,
    default_genre: String,

    pub search_query: String,
    pub debouncer: Debouncer<String>,
    /// Query behind the current movie list; `None` before the first fetch.
    pub active_query: Option<String>,
    pub movie_list: MovieList,
    pub results_state: ListState,

    pub trending: Vec<SearchRecord>,
    pub trending_cursor: usize,

    pub genres: Vec<Genre>,
    pub genre_cursor: usize,
    pub genre_cache: GenreCache,
    pub genre_movies_state: ListState,

    pub detail: DetailState,

    pub msg_tx: mpsc::UnboundedSender<AppMessage>,
    pub msg_rx: mpsc::UnboundedReceiver<AppMessage>,

    pub discovery: Arc<Discovery>,
}

impl App {
    pub fn new(config: &Config, discovery: Arc<Discovery>) -> Self {
        let (msg_tx, msg_rx) = mpsc::unbounded_channel();

        Self {
            running: true,
            view: View::Browse,
            previous_view: View::Browse,
            focus: Focus::Search,
            accent: widgets::parse_accent_color(&config.ui.accent_color),
            image_base_url: config.tmdb.image_base_url.clone(),
            default_genre: config.browse.default_genre.clone(),

            search_query: String::new(),
            debouncer: Debouncer::new(Duration::from_millis(config.browse.debounce_ms)),
            active_query: None,
            movie_list: MovieList::default(),
            results_state: ListState::default(),

            trending: Vec::new(),
            trending_cursor: 0,

            genres: Vec::new(),
            genre_cursor: 0,
            genre_cache: GenreCache::new(config.browse.genre_limit),
            genre_movies_state: ListState::default(),

            detail: DetailState::default(),

            msg_tx,
            msg_rx,

            discovery,
        }
    }

    pub async fn run(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        self.start();

        while self.running {
            terminal.draw(|frame| self.render(frame))?;
            self.handle_events()?;
            self.tick(Instant::now());
            self.process_messages();
        }

        Ok(())
    }

    /// Startup loads: trending, genres, and the unfiltered movie list.
    pub fn start(&mut self) {
        self.load_trending();
        self.load_genres();
        self.fetch_movies(String::new());
    }

    /// Release the debounced query once input has gone quiet.
    pub fn tick(&mut self, now: Instant) {
        if let Some(raw) = self.debouncer.poll(now) {
            let query = raw.trim().to_string();
            if self.active_query.as_deref() != Some(query.as_str()) {
                self.fetch_movies(query);
            }
        }
    }

    fn process_messages(&mut self) {
        while let Ok(msg) = self.msg_rx.try_recv() {
            self.handle_message(msg);
        }
    }

    pub fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Movies { query, result } => {
                self.movie_list.apply(&query, result);
                if self.movie_list.movies.is_empty() {
                    self.results_state.select(None);
                } else {
                    self.results_state.select(Some(0));
                }
            }
            AppMessage::Genres(genres) => {
                info!(count = genres.len(), "Loaded genres");
                self.genres = genres;
                if self.genre_cache.selected().is_none() {
                    let default = genre_cache::default_genre(&self.genres, &self.default_genre)
                        .cloned();
                    if let Some(genre) = default {
                        self.genre_cursor =
                            self.genres.iter().position(|g| g.id == genre.id).unwrap_or(0);
                        self.select_genre(genre);
                    }
                }
            }
            AppMessage::GenresError(e) => {
                error!(error = %e, "Error fetching genres");
            }
            AppMessage::GenreMovies(genre_id, movies) => {
                debug!(genre_id, count = movies.len(), "Genre movies loaded");
                self.genre_cache.fill(genre_id, movies);
                if self.genre_cache.selected().map(|g| g.id) == Some(genre_id) {
                    self.reset_genre_selection();
                }
            }
            AppMessage::GenreError(genre_id, e) => {
                error!(genre_id, error = %e, "Error loading movies for genre");
                self.genre_cache.fail(genre_id);
            }
            AppMessage::Trending(records) => {
                self.trending = records;
                self.trending_cursor = 0;
            }
            AppMessage::TrendingError(e) => {
                error!(error = %e, "Error fetching trending movies");
            }
            AppMessage::Details(id, details) => {
                if self.detail.movie_id == id {
                    self.detail.details = Some(details);
                }
            }
            AppMessage::DetailsError(id, e) => {
                error!(movie_id = id, error = %e, "Failed to fetch movie details");
                if self.detail.movie_id == id {
                    self.detail.error = Some(DETAIL_FAILED_MESSAGE.to_string());
                }
            }
        }
    }

    pub fn fetch_movies(&mut self, query: String) {
        self.active_query = Some(query.clone());
        self.movie_list.start();

        let discovery = Arc::clone(&self.discovery);
        let tx = self.msg_tx.clone();

        tokio::spawn(async move {
            let result = discovery.search(&query).await;
            let top = result.as_ref().ok().and_then(|m| m.first().cloned());
            let _ = tx.send(AppMessage::Movies {
                query: query.clone(),
                result,
            });

            // The list goes out first, the search is counted after
            discovery.record_search(&query, top.as_slice()).await;
        });
    }

    pub fn select_genre(&mut self, genre: Genre) {
        let genre_id = genre.id;
        if !self.genre_cache.select(genre) {
            self.reset_genre_selection();
            return;
        }

        self.genre_movies_state.select(None);
        let discovery = Arc::clone(&self.discovery);
        let tx = self.msg_tx.clone();

        tokio::spawn(async move {
            match discovery.genre_movies(genre_id).await {
                Ok(movies) => {
                    let _ = tx.send(AppMessage::GenreMovies(genre_id, movies));
                }
                Err(e) => {
                    let _ = tx.send(AppMessage::GenreError(genre_id, e.to_string()));
                }
            }
        });
    }

    fn reset_genre_selection(&mut self) {
        if self.genre_cache.selected_movies().is_empty() {
            self.genre_movies_state.select(None);
        } else {
            self.genre_movies_state.select(Some(0));
        }
    }

    fn load_genres(&self) {
        let discovery = Arc::clone(&self.discovery);
        let tx = self.msg_tx.clone();

        tokio::spawn(async move {
            match discovery.genres().await {
                Ok(genres) => {
                    let _ = tx.send(AppMessage::Genres(genres));
                }
                Err(e) => {
                    let _ = tx.send(AppMessage::GenresError(e.to_string()));
                }
            }
        });
    }

    fn load_trending(&self) {
        let discovery = Arc::clone(&self.discovery);
        let tx = self.msg_tx.clone();

        tokio::spawn(async move {
            match discovery.trending().await {
                Ok(records) => {
                    let _ = tx.send(AppMessage::Trending(records));
                }
                Err(e) => {
                    let _ = tx.send(AppMessage::TrendingError(e.to_string()));
                }
            }
        });
    }

    pub fn open_detail(&mut self, movie_id: u64) {
        self.detail = DetailState {
            movie_id,
            details: None,
            error: None,
        };
        self.view = View::Detail;

        let discovery = Arc::clone(&self.discovery);
        let tx = self.msg_tx.clone();

        tokio::spawn(async move {
            match discovery.details(movie_id).await {
                Ok(details) => {
                    let _ = tx.send(AppMessage::Details(movie_id, details));
                }
                Err(e) => {
                    let _ = tx.send(AppMessage::DetailsError(movie_id, e.to_string()));
                }
            }
        });
    }

    fn render(&mut self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(frame.area());

        let main_area = chunks[0];
        let help_area = chunks[1];

        match self.view {
            View::Browse => {
                self.render_browse(frame, main_area);
                let hints: &[(&str, &str)] = match self.focus {
                    Focus::Search => {
                        &[("type", "search"), ("Tab", "next pane"), ("Enter", "results")][..]
                    }
                    Focus::Trending | Focus::Genres => &[
                        ("h/l", "move"),
                        ("Enter", "select"),
                        ("Tab", "next pane"),
                        ("?", "help"),
                        ("q", "quit"),
                    ][..],
                    Focus::Results | Focus::GenreMovies => &[
                        ("j/k", "navigate"),
                        ("Enter", "details"),
                        ("/", "search"),
                        ("?", "help"),
                        ("q", "quit"),
                    ][..],
                };
                frame.render_widget(widgets::help_bar(hints), help_area);
            }
            View::Detail => {
                self.render_detail(frame, main_area);
                let help = widgets::help_bar(&[("Esc", "back to movies"), ("q", "quit")]);
                frame.render_widget(help, help_area);
            }
            View::Help => {
                match self.previous_view {
                    View::Detail => self.render_detail(frame, main_area),
                    _ => self.render_browse(frame, main_area),
                }
                self.render_help(frame);
            }
        }
    }

    fn render_browse(&mut self, frame: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Min(5),
            ])
            .split(area);

        render_search_input(
            frame,
            rows[0],
            &self.search_query,
            self.movie_list.loading,
            self.focus == Focus::Search,
            self.accent,
        );

        render_trending_rail(
            frame,
            rows[1],
            &self.trending,
            self.trending_cursor,
            self.focus == Focus::Trending,
            self.accent,
        );

        render_genre_bar(
            frame,
            rows[2],
            &self.genres,
            self.genre_cache.selected().map(|g| g.id),
            self.genre_cursor,
            self.focus == Focus::Genres,
            self.accent,
        );

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
            .split(rows[3]);

        let results_title = match self.active_query.as_deref() {
            Some(q) if !q.is_empty() => format!("Search Results for: {}", q),
            _ => "All Movies".to_string(),
        };
        render_movie_list(
            frame,
            columns[0],
            &results_title,
            &self.movie_list.movies,
            &mut self.results_state,
            self.movie_list.loading,
            self.movie_list.error.as_deref(),
            self.focus == Focus::Results,
            self.accent,
        );

        let genre_title = self
            .genre_cache
            .selected()
            .map(|g| format!("{} Movies", g.name))
            .unwrap_or_else(|| "Genre".to_string());
        render_movie_list(
            frame,
            columns[1],
            &genre_title,
            self.genre_cache.selected_movies(),
            &mut self.genre_movies_state,
            self.genre_cache.is_loading(),
            None,
            self.focus == Focus::GenreMovies,
            self.accent,
        );
    }

    fn render_detail(&self, frame: &mut Frame, area: Rect) {
        let poster_url = self
            .detail
            .details
            .as_ref()
            .and_then(|d| d.poster_path.as_ref())
            .map(|p| format!("{}{}", self.image_base_url, p));

        render_detail_view(
            frame,
            area,
            self.detail.movie_id,
            self.detail.details.as_ref(),
            self.detail.error.as_deref(),
            poster_url,
            self.accent,
        );
    }

    fn handle_events(&mut self) -> Result<()> {
        if event::poll(TICK)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(());
                }
                if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                    self.running = false;
                    return Ok(());
                }

                match self.view {
                    View::Browse => self.handle_browse_input(key, Instant::now()),
                    View::Detail => self.handle_detail_input(key.code),
                    View::Help => self.handle_help_input(key.code),
                }
            }
        }
        Ok(())
    }

    pub fn handle_browse_input(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Search => self.handle_search_input(key, now),
            Focus::Trending => self.handle_trending_input(key.code, now),
            Focus::Genres => self.handle_genres_input(key.code),
            Focus::Results | Focus::GenreMovies => self.handle_list_input(key.code),
        }
    }

    fn handle_search_input(&mut self, key: KeyEvent, now: Instant) {
        match key.code {
            KeyCode::Char(c) => {
                if !key
                    .modifiers
                    .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                {
                    self.search_query.push(c);
                    self.debouncer.push(self.search_query.clone(), now);
                }
            }
            KeyCode::Backspace => {
                if self.search_query.pop().is_some() {
                    self.debouncer.push(self.search_query.clone(), now);
                }
            }
            KeyCode::Enter | KeyCode::Down | KeyCode::Esc => {
                self.focus = Focus::Results;
            }
            _ => {}
        }
    }

    fn handle_trending_input(&mut self, key: KeyCode, now: Instant) {
        match key {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('?') => self.toggle_help(),
            KeyCode::Char('l') | KeyCode::Right => {
                if !self.trending.is_empty() {
                    self.trending_cursor = (self.trending_cursor + 1).min(self.trending.len() - 1);
                }
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.trending_cursor = self.trending_cursor.saturating_sub(1);
            }
            KeyCode::Enter => {
                if let Some(record) = self.trending.get(self.trending_cursor) {
                    self.search_query = record.search_term.clone();
                    self.debouncer.push(self.search_query.clone(), now);
                    self.focus = Focus::Results;
                }
            }
            _ => {}
        }
    }

    fn handle_genres_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('?') => self.toggle_help(),
            KeyCode::Char('l') | KeyCode::Right => {
                if !self.genres.is_empty() {
                    self.genre_cursor = (self.genre_cursor + 1).min(self.genres.len() - 1);
                }
            }
            KeyCode::Char('h') | KeyCode::Left => {
                self.genre_cursor = self.genre_cursor.saturating_sub(1);
            }
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(genre) = self.genres.get(self.genre_cursor).cloned() {
                    self.select_genre(genre);
                }
            }
            _ => {}
        }
    }

    fn handle_list_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('?') => self.toggle_help(),
            KeyCode::Char('/') => self.focus = Focus::Search,
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),
            KeyCode::Enter | KeyCode::Char('l') | KeyCode::Right => {
                if let Some(id) = self.selected_movie_id() {
                    self.open_detail(id);
                }
            }
            _ => {}
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let (state, len) = match self.focus {
            Focus::Results => (&mut self.results_state, self.movie_list.movies.len()),
            Focus::GenreMovies => (
                &mut self.genre_movies_state,
                self.genre_cache.selected_movies().len(),
            ),
            _ => return,
        };

        if len == 0 {
            return;
        }

        let next = match state.selected() {
            Some(i) => (i as isize + delta).clamp(0, len as isize - 1) as usize,
            None => 0,
        };
        state.select(Some(next));
    }

    fn selected_movie_id(&self) -> Option<u64> {
        match self.focus {
            Focus::Results => self
                .results_state
                .selected()
                .and_then(|i| self.movie_list.movies.get(i)),
            Focus::GenreMovies => self
                .genre_movies_state
                .selected()
                .and_then(|i| self.genre_cache.selected_movies().get(i)),
            _ => None,
        }
        .map(|m| m.id)
    }

    fn handle_detail_input(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') => self.running = false,
            KeyCode::Char('?') => self.toggle_help(),
            KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('h') | KeyCode::Left => {
                self.view = View::Browse;
            }
            _ => {}
        }
    }

    fn toggle_help(&mut self) {
        if self.view == View::Help {
            self.view = self.previous_view;
        } else {
            self.previous_view = self.view;
            self.view = View::Help;
        }
    }

    fn render_help(&self, frame: &mut Frame) {
        use ratatui::style::{Modifier, Style};
        use ratatui::widgets::{Block, Borders, Clear, Row, Table};

        let area = frame.area();
        let dialog_area = Rect {
            x: area.width.saturating_sub(64) / 2,
            y: area.height.saturating_sub(20) / 2,
            width: 64.min(area.width),
            height: 20.min(area.height),
        };

        frame.render_widget(Clear, dialog_area);

        let block = Block::default()
            .title(" Help ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(self.accent));

        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let rows = vec![
            Row::new(vec!["Global", "Tab", "Next pane"]),
            Row::new(vec!["", "Shift+Tab", "Previous pane"]),
            Row::new(vec!["", "?", "Toggle Help"]),
            Row::new(vec!["", "q / Ctrl+C", "Quit"]),
            Row::new(vec!["Search", "type", "Search (after a pause)"]),
            Row::new(vec!["", "Enter/Esc", "Go to results"]),
            Row::new(vec!["Trending", "h/l", "Move"]),
            Row::new(vec!["", "Enter", "Search this term"]),
            Row::new(vec!["Genres", "h/l", "Move"]),
            Row::new(vec!["", "Enter", "Show genre"]),
            Row::new(vec!["Lists", "j/k", "Navigate"]),
            Row::new(vec!["", "Enter", "Movie details"]),
            Row::new(vec!["", "/", "Back to search"]),
            Row::new(vec!["Details", "Esc", "Back to movies"]),
        ];

        let table = Table::new(
            rows,
            &[
                Constraint::Percentage(20),
                Constraint::Percentage(25),
                Constraint::Percentage(55),
            ],
        )
        .header(
            Row::new(vec!["Context", "Key", "Action"]).style(
                Style::default()
                    .add_modifier(Modifier::BOLD)
                    .fg(self.accent),
            ),
        )
        .block(Block::default().borders(Borders::NONE));

        frame.render_widget(table, inner);
    }

    fn handle_help_input(&mut self, key: KeyCode) {
        if let KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') = key {
            self.toggle_help();
        }
    }
}

pub fn init_terminal() -> io::Result<DefaultTerminal> {
    Ok(ratatui::init())
}

pub fn restore_terminal() -> io::Result<()> {
    ratatui::restore();
    Ok(())
}
