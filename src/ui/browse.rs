use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph, Wrap},
};

use crate::analytics::SearchRecord;
use crate::tmdb::{Genre, Movie};

use super::widgets::{focus_block, movie_line};

pub fn render_search_input(
    frame: &mut Frame,
    area: Rect,
    query: &str,
    is_loading: bool,
    focused: bool,
    accent: Color,
) {
    let title = if is_loading {
        "Search movies (loading...)"
    } else {
        "Search movies"
    };

    let (text, style) = if query.is_empty() && !focused {
        (
            "Search through thousands of movies",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        (query, Style::default().fg(Color::White))
    };

    let input = Paragraph::new(text)
        .block(focus_block(title, accent, focused))
        .style(style);

    frame.render_widget(input, area);

    if focused {
        frame.set_cursor_position((area.x + cursor_offset(query, area.width) + 1, area.y + 1));
    }
}

/// Cursor column inside the bordered input, kept within the box.
fn cursor_offset(query: &str, width: u16) -> u16 {
    query.chars().count().min(width.saturating_sub(2) as usize) as u16
}

/// Ranked search terms, most searched first.
pub fn render_trending_rail(
    frame: &mut Frame,
    area: Rect,
    trending: &[SearchRecord],
    cursor: usize,
    focused: bool,
    accent: Color,
) {
    let block = focus_block("Trending", accent, focused);

    if trending.is_empty() {
        let empty = Paragraph::new("No trending searches yet")
            .block(block)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let mut spans = Vec::new();
    for (i, record) in trending.iter().enumerate() {
        let style = if focused && i == cursor {
            Style::default()
                .bg(accent)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        spans.push(Span::styled(
            format!("{}", i + 1),
            Style::default().fg(accent).add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(" "));
        spans.push(Span::styled(record.search_term.as_str(), style));
        spans.push(Span::styled(
            format!(" ({})", record.count),
            Style::default().fg(Color::DarkGray),
        ));
        spans.push(Span::raw("   "));
    }

    let rail = Paragraph::new(Line::from(spans)).block(block);
    frame.render_widget(rail, area);
}

/// Genre buttons; the selected genre is filled, the cursor is underlined.
pub fn render_genre_bar(
    frame: &mut Frame,
    area: Rect,
    genres: &[Genre],
    selected: Option<u64>,
    cursor: usize,
    focused: bool,
    accent: Color,
) {
    let block = focus_block("Browse by Genre", accent, focused);

    if genres.is_empty() {
        let empty = Paragraph::new("Loading genres...")
            .block(block)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let spans: Vec<Span> = genres
        .iter()
        .enumerate()
        .flat_map(|(i, genre)| {
            let mut style = if Some(genre.id) == selected {
                Style::default()
                    .bg(Color::White)
                    .fg(Color::Black)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            if focused && i == cursor {
                style = style.add_modifier(Modifier::UNDERLINED).fg(accent);
            }
            vec![Span::styled(format!(" {} ", genre.name), style), Span::raw(" ")]
        })
        .collect();

    let bar = Paragraph::new(Line::from(spans))
        .block(block)
        .wrap(Wrap { trim: true });
    frame.render_widget(bar, area);
}

/// A movie list pane. `error` replaces the list; `loading` with no movies
/// shows a placeholder.
pub fn render_movie_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    movies: &[Movie],
    list_state: &mut ListState,
    is_loading: bool,
    error: Option<&str>,
    focused: bool,
    accent: Color,
) {
    let block = focus_block(title, accent, focused);

    if let Some(err) = error {
        let para = Paragraph::new(err)
            .block(block)
            .style(Style::default().fg(Color::Red))
            .wrap(Wrap { trim: true });
        frame.render_widget(para, area);
        return;
    }

    if movies.is_empty() {
        let msg = if is_loading { "Loading..." } else { "No movies found." };
        let empty = Paragraph::new(msg)
            .block(block)
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(empty, area);
        return;
    }

    let items: Vec<ListItem> = movies.iter().map(|m| ListItem::new(movie_line(m))).collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(accent)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    frame.render_stateful_widget(list, area, list_state);
}
