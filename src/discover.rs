use crate::page::{Page, Region};
use crate::render::{self, PosterSize};
use crate::tmdb::{Category, TmdbApi};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Query functions: fetch through `TmdbApi`, render, replace a page region.
///
/// A `None` from the API leaves the target region as it was.
#[derive(Clone)]
pub struct Discover {
    tmdb: Arc<dyn TmdbApi>,
    page: Arc<Page>,
}

impl Discover {
    pub fn new(tmdb: Arc<dyn TmdbApi>, page: Arc<Page>) -> Self {
        Self { tmdb, page }
    }

    pub fn page(&self) -> &Arc<Page> {
        &self.page
    }

    /// Genre list plus the four rails, all independent of each other.
    pub async fn startup(&self) {
        info!("Loading genres and category rails");
        tokio::join!(
            self.load_genres(),
            self.load_category(Category::Popular),
            self.load_category(Category::TopRated),
            self.load_category(Category::NowPlaying),
            self.load_category(Category::Upcoming),
        );
    }

    pub async fn load_genres(&self) {
        if !self.page.has(Region::GenreList).await {
            return;
        }
        let Some(genres) = self.tmdb.genres().await else {
            return;
        };
        let html = genres.iter().map(render::genre_list_item).collect();
        self.page.replace(Region::GenreList, html).await;
        info!("Rendered {} genres", genres.len());
    }

    pub async fn load_movies_by_genre(&self, genre_id: i64) {
        if !self.page.has(Region::Movies).await {
            return;
        }
        let Some(movies) = self.tmdb.discover_by_genre(genre_id).await else {
            return;
        };
        self.page
            .replace(Region::Movies, render::movie_cards(&movies, PosterSize::Large))
            .await;
        info!("Rendered {} movies for genre {}", movies.len(), genre_id);
    }

    pub async fn load_category(&self, category: Category) {
        let region = Region::Rail(category);
        if !self.page.has(region).await {
            return;
        }
        let Some(movies) = self.tmdb.category(category).await else {
            warn!("Rail '{}' left unchanged", category.label());
            return;
        };
        self.page
            .replace(region, render::movie_cards(&movies, PosterSize::Large))
            .await;
        debug!(rail = category.label(), count = movies.len(), "Rail rendered");
    }

    /// Opens the modal right away, then joins details, videos and similar titles.
    /// Any missing part closes the modal again without touching its content.
    pub async fn load_movie_details(&self, movie_id: i64) -> bool {
        if !self.page.has(Region::Modal).await {
            return false;
        }
        self.page.show(Region::Modal).await;

        let (details, videos, similar) = tokio::join!(
            self.tmdb.movie_details(movie_id),
            self.tmdb.movie_videos(movie_id),
            self.tmdb.similar_movies(movie_id),
        );
        let (Some(details), Some(videos), Some(similar)) = (details, videos, similar) else {
            warn!("Failed to fetch movie details for {}", movie_id);
            self.page.hide(Region::Modal).await;
            return false;
        };

        self.page
            .replace(
                Region::Modal,
                render::modal_body(&details, &videos, &similar),
            )
            .await;
        self.page.show(Region::Modal).await;
        info!("Showing details for '{}'", details.summary.title);
        true
    }

    pub async fn handle_search(&self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.page.clear_and_hide(Region::SearchDropdown).await;
            return;
        }
        if !self.page.has(Region::SearchDropdown).await {
            return;
        }
        let Some(results) = self.tmdb.search_movies(query).await else {
            return;
        };
        debug!(query = %query, hits = results.len(), "Search results");
        self.page
            .replace(Region::SearchDropdown, render::search_dropdown(&results))
            .await;
        self.page.show(Region::SearchDropdown).await;
    }

    pub async fn dismiss_modal(&self) {
        self.page.hide(Region::Modal).await;
    }

    pub async fn hide_dropdown(&self) {
        self.page.hide(Region::SearchDropdown).await;
    }
}
