use ratatui::{
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::tmdb::Movie;

/// Create a styled block with a title
pub fn titled_block(title: &str, accent: Color) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(accent))
        .title(format!(" {} ", title))
        .title_style(Style::default().fg(accent).add_modifier(Modifier::BOLD))
}

/// Block whose border dims when the pane does not have focus
pub fn focus_block(title: &str, accent: Color, focused: bool) -> Block<'_> {
    if focused {
        titled_block(title, accent)
    } else {
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" {} ", title))
    }
}

/// Create a help bar at the bottom
pub fn help_bar<'a>(hints: &'a [(&'a str, &'a str)]) -> Paragraph<'a> {
    let spans: Vec<Span> = hints
        .iter()
        .enumerate()
        .flat_map(|(i, (key, action))| {
            let mut v = vec![
                Span::styled(*key, Style::default().add_modifier(Modifier::BOLD)),
                Span::raw(" "),
                Span::styled(*action, Style::default().fg(Color::DarkGray)),
            ];
            if i < hints.len() - 1 {
                v.push(Span::raw("  "));
            }
            v
        })
        .collect();

    Paragraph::new(Line::from(spans))
}

/// One row of a movie list: rating, year, language, title
pub fn movie_line(movie: &Movie) -> Line<'_> {
    let rating = movie.rating_display();
    let rating_color = if movie.vote_average >= 7.0 {
        Color::Green
    } else if movie.vote_average >= 5.0 {
        Color::Yellow
    } else {
        Color::DarkGray
    };

    let year = movie
        .release_year()
        .map(|y| y.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let lang = movie
        .original_language
        .as_deref()
        .unwrap_or("--")
        .to_uppercase();

    Line::from(vec![
        Span::styled(format!("★ {:>3}", rating), Style::default().fg(rating_color)),
        Span::raw(" │ "),
        Span::styled(format!("{:>4}", year), Style::default().fg(Color::Cyan)),
        Span::raw(" │ "),
        Span::styled(format!("{:<2}", lang), Style::default().fg(Color::DarkGray)),
        Span::raw(" │ "),
        Span::styled(movie.title.as_str(), Style::default().fg(Color::White)),
    ])
}

/// Parse accent color from config string
pub fn parse_accent_color(color: &str) -> Color {
    match color.to_lowercase().as_str() {
        "red" => Color::Red,
        "green" => Color::Green,
        "yellow" => Color::Yellow,
        "blue" => Color::Blue,
        "magenta" => Color::Magenta,
        "cyan" => Color::Cyan,
        "white" => Color::White,
        "gray" | "grey" => Color::Gray,
        _ => Color::Yellow, // default
    }
}
