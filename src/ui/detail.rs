use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Paragraph, Wrap},
};

use crate::tmdb::{MovieDetails, format_money, format_rating};

use super::widgets::titled_block;

fn field<'a>(label: &'a str, value: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(
            format!("{:<14}", label),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::raw(value),
    ])
}

fn or_unknown(value: Option<&str>) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or("N/A")
        .to_string()
}

pub fn render_detail_view(
    frame: &mut Frame,
    area: Rect,
    movie_id: u64,
    details: Option<&MovieDetails>,
    error: Option<&str>,
    poster_url: Option<String>,
    accent: Color,
) {
    if let Some(err) = error {
        let para = Paragraph::new(err)
            .block(titled_block("Movie", accent))
            .style(Style::default().fg(Color::Red));
        frame.render_widget(para, area);
        return;
    }

    let Some(movie) = details else {
        let para = Paragraph::new(format!("Loading movie details for #{}...", movie_id))
            .block(titled_block("Movie", accent))
            .style(Style::default().fg(Color::DarkGray));
        frame.render_widget(para, area);
        return;
    };

    let block = titled_block(&movie.title, accent);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(10), Constraint::Min(3)])
        .split(inner);

    let tagline = movie.tagline.as_deref().unwrap_or("");
    let header = Paragraph::new(Line::styled(
        tagline,
        Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
    ));
    frame.render_widget(header, chunks[0]);

    let facts = vec![
        field("Rating", format_rating(movie.vote_average)),
        field("Release Date", or_unknown(movie.release_date.as_deref())),
        field(
            "Runtime",
            movie
                .runtime
                .map(|r| format!("{} minutes", r))
                .unwrap_or_else(|| "N/A".to_string()),
        ),
        field(
            "Language",
            or_unknown(movie.original_language.as_deref()).to_uppercase(),
        ),
        field("Genres", movie.genre_names()),
        field("Status", or_unknown(movie.status.as_deref())),
        field("Budget", format!("${}", format_money(movie.budget))),
        field("Revenue", format!("${}", format_money(movie.revenue))),
        field("Poster", poster_url.unwrap_or_else(|| "N/A".to_string())),
    ];
    frame.render_widget(Paragraph::new(Text::from(facts)), chunks[1]);

    let overview = Paragraph::new(movie.overview.as_str())
        .style(Style::default().fg(Color::Gray))
        .wrap(Wrap { trim: true });
    frame.render_widget(overview, chunks[2]);
}
