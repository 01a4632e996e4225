use crate::tmdb::Category;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tracing::debug;

/// Named areas of the page that query functions render into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    GenreList,
    Movies,
    Rail(Category),
    Modal,
    SearchDropdown,
}

impl Region {
    pub const ALL: [Region; 8] = [
        Region::GenreList,
        Region::Movies,
        Region::Rail(Category::Popular),
        Region::Rail(Category::TopRated),
        Region::Rail(Category::NowPlaying),
        Region::Rail(Category::Upcoming),
        Region::Modal,
        Region::SearchDropdown,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            Region::GenreList => "genres",
            Region::Movies => "movies",
            Region::Rail(Category::Popular) => "popular",
            Region::Rail(Category::TopRated) => "top-rated",
            Region::Rail(Category::NowPlaying) => "now-playing",
            Region::Rail(Category::Upcoming) => "upcoming",
            Region::Modal => "modal",
            Region::SearchDropdown => "dropdown",
        }
    }

    pub fn from_slug(slug: &str) -> Option<Region> {
        Region::ALL.into_iter().find(|r| r.slug() == slug)
    }

    /// Overlays start hidden and are toggled; everything else is always shown.
    pub fn is_overlay(&self) -> bool {
        matches!(self, Region::Modal | Region::SearchDropdown)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionState {
    pub html: String,
    pub visible: bool,
}

pub type PageSnapshot = BTreeMap<Region, RegionState>;

/// The live page: the set of regions it was built with and their content.
///
/// Regions missing from the layout turn every operation on them into a no-op.
/// `version` moves on every change so clients can tell when to re-read.
#[derive(Debug)]
pub struct Page {
    regions: Mutex<PageSnapshot>,
    version: AtomicU64,
}

impl Page {
    pub fn new(layout: impl IntoIterator<Item = Region>) -> Self {
        let regions = layout
            .into_iter()
            .map(|r| {
                (
                    r,
                    RegionState {
                        html: String::new(),
                        visible: !r.is_overlay(),
                    },
                )
            })
            .collect();
        Self {
            regions: Mutex::new(regions),
            version: AtomicU64::new(0),
        }
    }

    pub fn full() -> Self {
        Self::new(Region::ALL)
    }

    pub fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    fn bump(&self) {
        self.version.fetch_add(1, Ordering::SeqCst);
    }

    pub async fn has(&self, region: Region) -> bool {
        self.regions.lock().await.contains_key(&region)
    }

    /// Replaces the whole content of `region`. Returns false if the page lacks it.
    pub async fn replace(&self, region: Region, html: String) -> bool {
        let mut guard = self.regions.lock().await;
        match guard.get_mut(&region) {
            Some(state) => {
                debug!(region = region.slug(), bytes = html.len(), "Region replaced");
                state.html = html;
                self.bump();
                true
            }
            None => false,
        }
    }

    pub async fn show(&self, region: Region) {
        self.set_visible(region, true).await;
    }

    pub async fn hide(&self, region: Region) {
        self.set_visible(region, false).await;
    }

    pub async fn clear_and_hide(&self, region: Region) {
        let mut guard = self.regions.lock().await;
        if let Some(state) = guard.get_mut(&region) {
            state.html.clear();
            state.visible = false;
            self.bump();
        }
    }

    pub async fn get(&self, region: Region) -> Option<RegionState> {
        self.regions.lock().await.get(&region).cloned()
    }

    pub async fn snapshot(&self) -> PageSnapshot {
        self.regions.lock().await.clone()
    }

    /// Content and the version it corresponds to, read under one lock.
    pub async fn versioned_snapshot(&self) -> (u64, PageSnapshot) {
        let guard = self.regions.lock().await;
        (self.version(), guard.clone())
    }

    async fn set_visible(&self, region: Region, visible: bool) {
        if let Some(state) = self.regions.lock().await.get_mut(&region) {
            if state.visible != visible {
                state.visible = visible;
                self.bump();
            }
        }
    }
}
