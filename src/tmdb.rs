use crate::models::{Genre, GenreList, MovieDetails, MovieSummary, Paged, Video, VideoList};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

pub const TMDB_BASE: &str = "https://api.themoviedb.org/3";

/// Fixed-endpoint movie listings shown as rails on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    Popular,
    TopRated,
    NowPlaying,
    Upcoming,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Popular,
        Category::TopRated,
        Category::NowPlaying,
        Category::Upcoming,
    ];

    pub fn endpoint(&self) -> &'static str {
        match self {
            Category::Popular => "movie/popular",
            Category::TopRated => "movie/top_rated",
            Category::NowPlaying => "movie/now_playing",
            Category::Upcoming => "movie/upcoming",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Popular => "Popular",
            Category::TopRated => "Top Rated",
            Category::NowPlaying => "Now Playing",
            Category::Upcoming => "Upcoming",
        }
    }
}

/// Every method collapses transport, status and shape failures into `None`.
#[async_trait]
pub trait TmdbApi: Send + Sync {
    async fn genres(&self) -> Option<Vec<Genre>>;
    async fn discover_by_genre(&self, genre_id: i64) -> Option<Vec<MovieSummary>>;
    async fn category(&self, category: Category) -> Option<Vec<MovieSummary>>;
    async fn movie_details(&self, movie_id: i64) -> Option<MovieDetails>;
    async fn movie_videos(&self, movie_id: i64) -> Option<Vec<Video>>;
    async fn similar_movies(&self, movie_id: i64) -> Option<Vec<MovieSummary>>;
    async fn search_movies(&self, query: &str) -> Option<Vec<MovieSummary>>;
}

#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl TmdbClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn request_url(&self, endpoint: &str) -> String {
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        format!(
            "{}/{}{}api_key={}",
            self.base_url,
            endpoint.trim_start_matches('/'),
            separator,
            self.api_key
        )
    }

    pub async fn fetch_json<T: DeserializeOwned>(&self, endpoint: &str) -> Option<T> {
        let url = self.request_url(endpoint);
        debug!(endpoint = %endpoint, "TMDB request");
        let res = match self.client.get(&url).send().await {
            Ok(res) => res,
            Err(e) => {
                warn!("TMDB request to '{}' failed: {}", endpoint, e);
                return None;
            }
        };
        let status = res.status();
        if !status.is_success() {
            warn!("TMDB '{}' returned HTTP {}", endpoint, status);
            return None;
        }
        let text = match res.text().await {
            Ok(text) => text,
            Err(e) => {
                warn!("Reading TMDB '{}' body failed: {}", endpoint, e);
                return None;
            }
        };
        match serde_json::from_str(&text) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("TMDB '{}' returned an unexpected shape: {}", endpoint, e);
                None
            }
        }
    }
}

#[async_trait]
impl TmdbApi for TmdbClient {
    async fn genres(&self) -> Option<Vec<Genre>> {
        self.fetch_json::<GenreList>("genre/movie/list?language=en-US")
            .await
            .map(|g| g.genres)
    }

    async fn discover_by_genre(&self, genre_id: i64) -> Option<Vec<MovieSummary>> {
        self.fetch_json::<Paged<MovieSummary>>(&format!("discover/movie?with_genres={genre_id}"))
            .await
            .map(|p| p.results)
    }

    async fn category(&self, category: Category) -> Option<Vec<MovieSummary>> {
        self.fetch_json::<Paged<MovieSummary>>(category.endpoint())
            .await
            .map(|p| p.results)
    }

    async fn movie_details(&self, movie_id: i64) -> Option<MovieDetails> {
        self.fetch_json(&format!("movie/{movie_id}")).await
    }

    async fn movie_videos(&self, movie_id: i64) -> Option<Vec<Video>> {
        self.fetch_json::<VideoList>(&format!("movie/{movie_id}/videos"))
            .await
            .map(|v| v.results)
    }

    async fn similar_movies(&self, movie_id: i64) -> Option<Vec<MovieSummary>> {
        self.fetch_json::<Paged<MovieSummary>>(&format!("movie/{movie_id}/similar"))
            .await
            .map(|p| p.results)
    }

    async fn search_movies(&self, query: &str) -> Option<Vec<MovieSummary>> {
        let endpoint = format!("search/movie?query={}", urlencoding::encode(query));
        self.fetch_json::<Paged<MovieSummary>>(&endpoint)
            .await
            .map(|p| p.results)
    }
}
