use crate::debounce::Debouncer;
use crate::discover::Discover;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::debug;

/// User actions the page can raise.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    SelectGenre(i64),
    OpenDetails(i64),
    DismissModal,
    SearchInput(String),
    SearchBlur,
    SelectDropdownItem(i64),
}

/// One handler per action. Handlers run on their own task so the caller never
/// waits on TMDB.
pub struct Controller {
    discover: Discover,
    search: Debouncer<String>,
    blur_grace: Duration,
}

impl Controller {
    pub fn new(discover: Discover, search_quiet: Duration, blur_grace: Duration) -> Self {
        let searcher = discover.clone();
        let search = Debouncer::new(search_quiet, move |query: String| {
            let searcher = searcher.clone();
            async move { searcher.handle_search(&query).await }
        });
        Self {
            discover,
            search,
            blur_grace,
        }
    }

    pub fn discover(&self) -> &Discover {
        &self.discover
    }

    pub fn dispatch(self: &Arc<Self>, event: Event) -> JoinHandle<()> {
        debug!(?event, "Dispatching");
        match event {
            Event::SelectGenre(id) => {
                self.spawn(move |c| async move { c.on_select_genre(id).await })
            }
            Event::OpenDetails(id) => {
                self.spawn(move |c| async move { c.on_open_details(id).await })
            }
            Event::DismissModal => self.spawn(|c| async move { c.on_dismiss_modal().await }),
            Event::SearchInput(query) => self.on_search_input(query),
            Event::SearchBlur => self.spawn(|c| async move { c.on_search_blur().await }),
            Event::SelectDropdownItem(id) => {
                self.spawn(move |c| async move { c.on_select_dropdown_item(id).await })
            }
        }
    }

    pub async fn on_select_genre(&self, genre_id: i64) {
        self.discover.load_movies_by_genre(genre_id).await;
    }

    pub async fn on_open_details(&self, movie_id: i64) {
        self.discover.load_movie_details(movie_id).await;
    }

    pub async fn on_dismiss_modal(&self) {
        self.discover.dismiss_modal().await;
    }

    pub fn on_search_input(&self, query: String) -> JoinHandle<()> {
        self.search.call(query)
    }

    /// Waits out the grace period so a click on a dropdown item lands first.
    pub async fn on_search_blur(&self) {
        tokio::time::sleep(self.blur_grace).await;
        self.discover.hide_dropdown().await;
    }

    pub async fn on_select_dropdown_item(&self, movie_id: i64) {
        self.discover.hide_dropdown().await;
        self.discover.load_movie_details(movie_id).await;
    }

    fn spawn<F, Fut>(self: &Arc<Self>, handler: F) -> JoinHandle<()>
    where
        F: FnOnce(Arc<Self>) -> Fut,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        tokio::spawn(handler(self.clone()))
    }
}
