pub mod browse;
pub mod detail;
pub mod widgets;

pub use browse::{render_genre_bar, render_movie_list, render_search_input, render_trending_rail};
pub use detail::render_detail_view;
