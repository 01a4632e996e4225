//! Markup builders. Pure: no I/O, no page access, every interpolated value escaped.

use crate::models::{Genre, MovieDetails, MovieSummary, Video};
use crate::page::{PageSnapshot, Region};

pub const POSTER_BASE_LARGE: &str = "https://image.tmdb.org/t/p/w500";
pub const POSTER_BASE_SMALL: &str = "https://image.tmdb.org/t/p/w200";
pub const PLACEHOLDER_LARGE: &str = "https://via.placeholder.com/500x750?text=No+Image";
pub const PLACEHOLDER_SMALL: &str = "https://via.placeholder.com/200x300?text=No+Image";
pub const YOUTUBE_EMBED_BASE: &str = "https://www.youtube.com/embed/";

pub const NO_TRAILERS: &str = "<h4>No trailers available.</h4>";
pub const NO_SIMILAR: &str = "<h4>No similar movies found.</h4>";
pub const NO_RESULTS: &str = r#"<li class="search-empty">No results</li>"#;

pub const MAX_SIMILAR: usize = 4;
pub const MAX_SEARCH_RESULTS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PosterSize {
    /// Grid, rails and modal.
    Large,
    /// Dropdown and similar-movies panel.
    Small,
}

impl PosterSize {
    fn base(&self) -> &'static str {
        match self {
            PosterSize::Large => POSTER_BASE_LARGE,
            PosterSize::Small => POSTER_BASE_SMALL,
        }
    }

    fn placeholder(&self) -> &'static str {
        match self {
            PosterSize::Large => PLACEHOLDER_LARGE,
            PosterSize::Small => PLACEHOLDER_SMALL,
        }
    }

    fn class(&self) -> &'static str {
        match self {
            PosterSize::Large => "movie-card movie-card--large",
            PosterSize::Small => "movie-card movie-card--small",
        }
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn poster_url(poster_path: Option<&str>, size: PosterSize) -> String {
    match poster_path.filter(|p| !p.trim().is_empty()) {
        Some(path) => format!("{}{}", size.base(), path),
        None => size.placeholder().to_string(),
    }
}

/// One decimal place, halves rounded away from zero (`7.25` -> `7.3`).
pub fn format_rating(vote_average: f64) -> String {
    let rounded = (vote_average * 10.0).round() / 10.0;
    format!("{rounded:.1}")
}

pub fn movie_card(movie: &MovieSummary, size: PosterSize) -> String {
    let title = escape_html(&movie.title);
    format!(
        r#"<div class="{class}" data-movie-id="{id}"><img src="{src}" alt="{title} poster"><div class="movie-info"><h3 class="movie-title">{title}</h3><p>Rating: {rating}</p></div></div>"#,
        class = size.class(),
        id = movie.id,
        src = escape_html(&poster_url(movie.poster_path.as_deref(), size)),
        rating = format_rating(movie.vote_average),
    )
}

pub fn movie_cards(movies: &[MovieSummary], size: PosterSize) -> String {
    movies.iter().map(|m| movie_card(m, size)).collect()
}

pub fn genre_list_item(genre: &Genre) -> String {
    format!(
        r##"<li data-id="{}"><a href="#">{}</a></li>"##,
        genre.id,
        escape_html(&genre.name)
    )
}

pub fn find_trailer(videos: &[Video]) -> Option<&Video> {
    videos.iter().find(|v| v.is_youtube_trailer())
}

pub fn trailer_block(videos: &[Video]) -> String {
    let Some(trailer) = find_trailer(videos) else {
        return NO_TRAILERS.to_string();
    };
    format!(
        r#"<h4>Trailer</h4><div class="video-container"><iframe src="{YOUTUBE_EMBED_BASE}{}" frameborder="0" allow="accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture" allowfullscreen></iframe></div>"#,
        escape_html(&trailer.key)
    )
}

pub fn similar_movies_block(movies: &[MovieSummary]) -> String {
    if movies.is_empty() {
        return NO_SIMILAR.to_string();
    }
    let cards: String = movies
        .iter()
        .take(MAX_SIMILAR)
        .map(similar_movie_card)
        .collect();
    format!(r#"<h4>Similar Movies</h4><div class="similar-movies-grid">{cards}</div>"#)
}

fn similar_movie_card(movie: &MovieSummary) -> String {
    let title = escape_html(&movie.title);
    format!(
        r#"<div class="similar-movie-card" data-movie-id="{}"><img src="{}" alt="{title} poster"><p>{title}</p></div>"#,
        movie.id,
        escape_html(&poster_url(movie.poster_path.as_deref(), PosterSize::Small)),
    )
}

pub fn search_dropdown_item(movie: &MovieSummary) -> String {
    let title = escape_html(&movie.title);
    format!(
        r#"<li class="search-result" data-movie-id="{}"><img src="{}" alt="{title} poster"><span class="search-result-title">{title}</span><span class="search-result-rating">{}</span></li>"#,
        movie.id,
        escape_html(&poster_url(movie.poster_path.as_deref(), PosterSize::Small)),
        format_rating(movie.vote_average),
    )
}

pub fn search_dropdown(movies: &[MovieSummary]) -> String {
    if movies.is_empty() {
        return NO_RESULTS.to_string();
    }
    movies
        .iter()
        .take(MAX_SEARCH_RESULTS)
        .map(search_dropdown_item)
        .collect()
}

pub fn details_header(details: &MovieDetails) -> String {
    let movie = &details.summary;
    let title = escape_html(&movie.title);
    format!(
        r#"<span class="modal-close">&times;</span><h2>{title}</h2><img src="{src}" alt="{title} poster"><p><strong>Overview:</strong> {overview}</p><p><strong>Release Date:</strong> {release}</p><p><strong>Rating:</strong> {rating}</p>"#,
        src = escape_html(&poster_url(movie.poster_path.as_deref(), PosterSize::Large)),
        overview = escape_html(&details.overview),
        release = escape_html(&details.release_date),
        rating = format_rating(movie.vote_average),
    )
}

pub fn modal_body(details: &MovieDetails, videos: &[Video], similar: &[MovieSummary]) -> String {
    format!(
        r#"<div class="modal-body">{}{}{}</div>"#,
        details_header(details),
        trailer_block(videos),
        similar_movies_block(similar)
    )
}

fn region_heading(region: Region) -> Option<&'static str> {
    match region {
        Region::GenreList => Some("Genres"),
        Region::Movies => Some("Movies"),
        Region::Rail(category) => Some(category.label()),
        Region::Modal | Region::SearchDropdown => None,
    }
}

fn region_markup(region: Region, html: &str, visible: bool) -> String {
    let tag = match region {
        Region::GenreList | Region::SearchDropdown => "ul",
        _ => "div",
    };
    let hidden = if visible { "" } else { " hidden" };
    let body = match region {
        Region::Modal => format!(r#"<div class="modal-content">{html}</div>"#),
        _ => html.to_string(),
    };
    let heading = region_heading(region)
        .map(|h| format!("<h2>{h}</h2>"))
        .unwrap_or_default();
    format!(
        r#"{heading}<{tag} id="{slug}" data-region="{slug}"{hidden}>{body}</{tag}>"#,
        slug = region.slug()
    )
}

/// Re-reads the page whenever `/version` moves, for a bounded time after each event.
const PAGE_SCRIPT: &str = r##"<script>
const POLL_MS = 250;
const POLL_TRIES = 40;
let seen = Number(document.body.dataset.version);
let tries = 0;
let polling = null;
const refresh = () => fetch("/").then(r => r.text()).then(t => {
  const doc = new DOMParser().parseFromString(t, "text/html");
  seen = Math.max(seen, Number(doc.body.dataset.version));
  document.querySelectorAll("[data-region]").forEach(el => {
    const next = doc.getElementById(el.id);
    if (next) { el.innerHTML = next.innerHTML; el.hidden = next.hidden; }
  });
});
const poll = () => fetch("/version").then(r => r.text()).then(v => {
  if (Number(v) !== seen) refresh();
  if (++tries >= POLL_TRIES) { clearInterval(polling); polling = null; }
});
const watch = () => {
  tries = 0;
  if (!polling) polling = setInterval(poll, POLL_MS);
};
const post = (path) => fetch(path, { method: "POST" }).then(watch);
document.addEventListener("click", (e) => {
  const genre = e.target.closest("[data-region=genres] li[data-id]");
  if (genre) { e.preventDefault(); return post(`/events/genres/${genre.dataset.id}`); }
  const hit = e.target.closest("#dropdown [data-movie-id]");
  if (hit) return post(`/events/dropdown/${hit.dataset.movieId}`);
  const card = e.target.closest("[data-movie-id]");
  if (card) return post(`/events/movies/${card.dataset.movieId}`);
  if (e.target.id === "modal" || e.target.classList.contains("modal-close")) post("/events/modal/dismiss");
});
const search = document.getElementById("search");
if (search) {
  search.addEventListener("input", () => post(`/events/search?q=${encodeURIComponent(search.value)}`));
  search.addEventListener("blur", () => post("/events/search/blur"));
}
watch();
</script>"##;

/// Full page shell with the current content of every region the page has.
/// The search dropdown sits directly under the search input.
pub fn document(snapshot: &PageSnapshot, version: u64) -> String {
    let mut body = String::new();
    if let Some(dropdown) = snapshot.get(&Region::SearchDropdown) {
        body.push_str(r#"<input id="search" type="search" placeholder="Search movies" autocomplete="off">"#);
        body.push_str(&region_markup(
            Region::SearchDropdown,
            &dropdown.html,
            dropdown.visible,
        ));
    }
    for (region, state) in snapshot {
        if *region == Region::SearchDropdown {
            continue;
        }
        body.push_str(&region_markup(*region, &state.html, state.visible));
    }
    format!(
        "<!doctype html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>cinedeck</title></head><body data-version=\"{version}\">{body}{PAGE_SCRIPT}</body></html>"
    )
}
