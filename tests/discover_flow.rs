use axum::body::Body;
use axum::http::{Request, StatusCode};
use cinedeck::app::{build_router, AppState};
use cinedeck::config::Config;
use cinedeck::discover::Discover;
use cinedeck::events::{Controller, Event};
use cinedeck::models::{Genre, MovieDetails, MovieSummary, Video};
use cinedeck::page::{Page, Region};
use cinedeck::render::{NO_SIMILAR, PLACEHOLDER_LARGE};
use cinedeck::tmdb::{Category, TmdbApi};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;
use tower::util::ServiceExt;

#[derive(Default)]
struct FakeTmdb {
    genres: Option<Vec<Genre>>,
    discover: Option<Vec<MovieSummary>>,
    categories: HashMap<Category, Vec<MovieSummary>>,
    details: Option<MovieDetails>,
    videos: Option<Vec<Video>>,
    similar: Option<Vec<MovieSummary>>,
    search: Option<Vec<MovieSummary>>,
    details_gate: Option<Arc<Notify>>,
    search_delay: Option<Duration>,
    calls: Mutex<Vec<String>>,
}

impl FakeTmdb {
    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn search_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| c.starts_with("search:"))
            .collect()
    }
}

#[async_trait::async_trait]
impl TmdbApi for FakeTmdb {
    async fn genres(&self) -> Option<Vec<Genre>> {
        self.record("genres".to_string());
        self.genres.clone()
    }

    async fn discover_by_genre(&self, genre_id: i64) -> Option<Vec<MovieSummary>> {
        self.record(format!("discover:{genre_id}"));
        self.discover.clone()
    }

    async fn category(&self, category: Category) -> Option<Vec<MovieSummary>> {
        self.record(format!("category:{}", category.endpoint()));
        self.categories.get(&category).cloned()
    }

    async fn movie_details(&self, movie_id: i64) -> Option<MovieDetails> {
        self.record(format!("details:{movie_id}"));
        if let Some(gate) = &self.details_gate {
            gate.notified().await;
        }
        self.details.clone()
    }

    async fn movie_videos(&self, movie_id: i64) -> Option<Vec<Video>> {
        self.record(format!("videos:{movie_id}"));
        self.videos.clone()
    }

    async fn similar_movies(&self, movie_id: i64) -> Option<Vec<MovieSummary>> {
        self.record(format!("similar:{movie_id}"));
        self.similar.clone()
    }

    async fn search_movies(&self, query: &str) -> Option<Vec<MovieSummary>> {
        self.record(format!("search:{query}"));
        if let Some(delay) = self.search_delay {
            tokio::time::sleep(delay).await;
        }
        self.search.clone()
    }
}

fn movie(id: i64, title: &str, poster: Option<&str>, vote: f64) -> MovieSummary {
    MovieSummary {
        id,
        title: title.to_string(),
        poster_path: poster.map(|p| p.to_string()),
        vote_average: vote,
    }
}

fn matrix_details() -> MovieDetails {
    MovieDetails {
        summary: movie(603, "The Matrix", Some("/matrix.jpg"), 8.2),
        overview: "A hacker learns the truth.".to_string(),
        release_date: "1999-03-30".to_string(),
    }
}

fn trailer(key: &str) -> Video {
    Video {
        site: "YouTube".to_string(),
        video_type: "Trailer".to_string(),
        key: key.to_string(),
    }
}

fn discover_with(fake: FakeTmdb) -> (Discover, Arc<FakeTmdb>, Arc<Page>) {
    let fake = Arc::new(fake);
    let page = Arc::new(Page::full());
    (Discover::new(fake.clone(), page.clone()), fake, page)
}

fn test_config() -> Config {
    Config::from_lookup(|key| match key {
        "TMDB_API_KEY" => Some("test-key".to_string()),
        _ => None,
    })
    .expect("static config is valid")
}

#[tokio::test]
async fn genre_selection_renders_placeholder_card() {
    let (discover, fake, page) = discover_with(FakeTmdb {
        discover: Some(vec![movie(1, "A", None, 5.0)]),
        ..Default::default()
    });

    discover.load_movies_by_genre(28).await;

    let html = page.get(Region::Movies).await.unwrap().html;
    assert_eq!(html.matches("data-movie-id=").count(), 1);
    assert!(html.contains(&format!(r#"src="{PLACEHOLDER_LARGE}""#)));
    assert!(html.contains("Rating: 5.0"));
    assert_eq!(fake.calls(), vec!["discover:28".to_string()]);
}

#[tokio::test]
async fn failed_genre_list_keeps_previous_content() {
    let (discover, _fake, page) = discover_with(FakeTmdb::default());
    page.replace(Region::GenreList, "<li>cached</li>".to_string())
        .await;

    discover.load_genres().await;

    assert_eq!(page.get(Region::GenreList).await.unwrap().html, "<li>cached</li>");
}

#[tokio::test]
async fn genre_list_renders_every_genre() {
    let (discover, _fake, page) = discover_with(FakeTmdb {
        genres: Some(vec![
            Genre {
                id: 28,
                name: "Action".to_string(),
            },
            Genre {
                id: 35,
                name: "Comedy".to_string(),
            },
        ]),
        ..Default::default()
    });

    discover.load_genres().await;

    let html = page.get(Region::GenreList).await.unwrap().html;
    assert!(html.contains(r#"<li data-id="28">"#));
    assert!(html.contains(r#"<li data-id="35">"#));
}

#[tokio::test]
async fn startup_isolates_category_failures() {
    let mut categories = HashMap::new();
    categories.insert(Category::Popular, vec![movie(10, "Pop", None, 7.0)]);
    categories.insert(Category::Upcoming, vec![movie(20, "Soon", None, 6.5)]);
    let (discover, fake, page) = discover_with(FakeTmdb {
        categories,
        ..Default::default()
    });

    discover.startup().await;

    let popular = page.get(Region::Rail(Category::Popular)).await.unwrap();
    let top_rated = page.get(Region::Rail(Category::TopRated)).await.unwrap();
    let upcoming = page.get(Region::Rail(Category::Upcoming)).await.unwrap();
    assert!(popular.html.contains(r#"data-movie-id="10""#));
    assert!(upcoming.html.contains(r#"data-movie-id="20""#));
    assert!(top_rated.html.is_empty());
    assert_eq!(fake.calls().len(), 5);
}

#[tokio::test]
async fn details_failure_closes_modal_without_partial_render() {
    let (discover, _fake, page) = discover_with(FakeTmdb {
        details: Some(matrix_details()),
        videos: None,
        similar: Some(vec![movie(2, "Other", None, 6.0)]),
        ..Default::default()
    });

    assert!(!discover.load_movie_details(603).await);

    let modal = page.get(Region::Modal).await.unwrap();
    assert!(!modal.visible);
    assert!(modal.html.is_empty());
}

#[tokio::test]
async fn details_failure_on_missing_movie_closes_modal() {
    let (discover, fake, page) = discover_with(FakeTmdb {
        details: None,
        videos: Some(vec![trailer("abc")]),
        similar: Some(Vec::new()),
        ..Default::default()
    });

    assert!(!discover.load_movie_details(603).await);

    let modal = page.get(Region::Modal).await.unwrap();
    assert!(!modal.visible);
    assert!(modal.html.is_empty());
    assert!(fake.calls().contains(&"details:603".to_string()));
}

#[tokio::test]
async fn details_failure_on_similar_closes_modal() {
    let (discover, fake, page) = discover_with(FakeTmdb {
        details: Some(matrix_details()),
        videos: Some(vec![trailer("abc")]),
        similar: None,
        ..Default::default()
    });

    assert!(!discover.load_movie_details(603).await);

    let modal = page.get(Region::Modal).await.unwrap();
    assert!(!modal.visible);
    assert!(modal.html.is_empty());
    assert!(fake.calls().contains(&"similar:603".to_string()));
}

#[tokio::test]
async fn failed_details_leave_previous_modal_content() {
    let (discover, _fake, page) = discover_with(FakeTmdb {
        details: Some(matrix_details()),
        videos: Some(Vec::new()),
        similar: None,
        ..Default::default()
    });
    page.replace(Region::Modal, "<p>previous</p>".to_string())
        .await;

    assert!(!discover.load_movie_details(603).await);

    let modal = page.get(Region::Modal).await.unwrap();
    assert!(!modal.visible);
    assert_eq!(modal.html, "<p>previous</p>");
}

#[tokio::test]
async fn details_open_optimistically_before_data_arrives() {
    let gate = Arc::new(Notify::new());
    let (discover, _fake, page) = discover_with(FakeTmdb {
        details: Some(matrix_details()),
        videos: Some(vec![trailer("abc")]),
        similar: Some(Vec::new()),
        details_gate: Some(gate.clone()),
        ..Default::default()
    });

    let task = tokio::spawn({
        let discover = discover.clone();
        async move { discover.load_movie_details(603).await }
    });
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !page.get(Region::Modal).await.unwrap().visible {
        assert!(tokio::time::Instant::now() < deadline, "modal never opened");
        tokio::task::yield_now().await;
    }
    assert!(page.get(Region::Modal).await.unwrap().html.is_empty());

    gate.notify_one();
    assert!(task.await.unwrap());

    let modal = page.get(Region::Modal).await.unwrap();
    assert!(modal.visible);
    assert!(modal.html.contains("<h2>The Matrix</h2>"));
    assert!(modal.html.contains("embed/abc"));
    assert!(modal.html.contains(NO_SIMILAR));
}

#[tokio::test]
async fn blank_search_clears_dropdown_without_request() {
    let (discover, fake, page) = discover_with(FakeTmdb {
        search: Some(vec![movie(1, "A", None, 5.0)]),
        ..Default::default()
    });
    page.replace(Region::SearchDropdown, "<li>old</li>".to_string())
        .await;
    page.show(Region::SearchDropdown).await;

    for query in ["", "   "] {
        discover.handle_search(query).await;
        let dropdown = page.get(Region::SearchDropdown).await.unwrap();
        assert!(dropdown.html.is_empty());
        assert!(!dropdown.visible);
    }
    assert!(fake.calls().is_empty());
}

#[tokio::test]
async fn search_shows_first_five_results() {
    let results = (1..=7).map(|i| movie(i, "Hit", None, 7.0)).collect();
    let (discover, fake, page) = discover_with(FakeTmdb {
        search: Some(results),
        ..Default::default()
    });

    discover.handle_search("  matrix ").await;

    let dropdown = page.get(Region::SearchDropdown).await.unwrap();
    assert!(dropdown.visible);
    assert_eq!(dropdown.html.matches("search-result\"").count(), 5);
    assert_eq!(fake.search_calls(), vec!["search:matrix".to_string()]);
}

#[tokio::test]
async fn failed_search_leaves_dropdown_as_it_was() {
    let (discover, fake, page) = discover_with(FakeTmdb::default());
    page.replace(Region::SearchDropdown, "<li>old</li>".to_string())
        .await;
    page.show(Region::SearchDropdown).await;

    discover.handle_search("matrix").await;

    let dropdown = page.get(Region::SearchDropdown).await.unwrap();
    assert_eq!(dropdown.html, "<li>old</li>");
    assert!(dropdown.visible);
    assert_eq!(fake.search_calls(), vec!["search:matrix".to_string()]);
}

#[tokio::test]
async fn absent_regions_make_operations_no_ops() {
    let fake = Arc::new(FakeTmdb {
        genres: Some(Vec::new()),
        details: Some(matrix_details()),
        ..Default::default()
    });
    let page = Arc::new(Page::new([Region::Movies]));
    let discover = Discover::new(fake.clone(), page.clone());

    discover.load_genres().await;
    assert!(!discover.load_movie_details(603).await);
    discover.handle_search("matrix").await;

    assert!(fake.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn keystroke_burst_issues_one_search() {
    let (discover, fake, page) = discover_with(FakeTmdb {
        search: Some(vec![movie(1, "Matrix", None, 8.0)]),
        ..Default::default()
    });
    let controller = Arc::new(Controller::new(
        discover,
        Duration::from_millis(300),
        Duration::from_millis(200),
    ));

    for query in ["m", "ma", "mat", "matr"] {
        controller.dispatch(Event::SearchInput(query.to_string()));
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    let last = controller.dispatch(Event::SearchInput("matrix".to_string()));
    last.await.unwrap();

    assert_eq!(fake.search_calls(), vec!["search:matrix".to_string()]);
    assert!(page.get(Region::SearchDropdown).await.unwrap().visible);
}

#[tokio::test(start_paused = true)]
async fn blur_hides_dropdown_after_grace_period() {
    let (discover, _fake, page) = discover_with(FakeTmdb::default());
    page.show(Region::SearchDropdown).await;
    let controller = Arc::new(Controller::new(
        discover,
        Duration::from_millis(300),
        Duration::from_millis(200),
    ));

    let blur = controller.dispatch(Event::SearchBlur);
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(page.get(Region::SearchDropdown).await.unwrap().visible);

    blur.await.unwrap();
    assert!(!page.get(Region::SearchDropdown).await.unwrap().visible);
}

#[tokio::test]
async fn dropdown_selection_hides_dropdown_and_opens_details() {
    let (discover, fake, page) = discover_with(FakeTmdb {
        details: Some(matrix_details()),
        videos: Some(Vec::new()),
        similar: Some(Vec::new()),
        ..Default::default()
    });
    page.show(Region::SearchDropdown).await;
    let controller = Arc::new(Controller::new(
        discover,
        Duration::from_millis(300),
        Duration::from_millis(200),
    ));

    controller
        .dispatch(Event::SelectDropdownItem(603))
        .await
        .unwrap();

    assert!(!page.get(Region::SearchDropdown).await.unwrap().visible);
    assert!(page.get(Region::Modal).await.unwrap().visible);
    assert!(fake.calls().contains(&"details:603".to_string()));
}

#[tokio::test]
async fn dismiss_hides_modal() {
    let (discover, _fake, page) = discover_with(FakeTmdb::default());
    page.show(Region::Modal).await;
    let controller = Arc::new(Controller::new(
        discover,
        Duration::from_millis(300),
        Duration::from_millis(200),
    ));

    controller.dispatch(Event::DismissModal).await.unwrap();

    assert!(!page.get(Region::Modal).await.unwrap().visible);
}

fn app_with_fake(fake: FakeTmdb) -> (axum::Router, Arc<Page>) {
    let page = Arc::new(Page::full());
    let state = AppState::new(Arc::new(fake), page.clone(), &test_config());
    (build_router(state), page)
}

async fn body_text(res: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .expect("body readable");
    String::from_utf8(bytes.to_vec()).expect("utf-8 body")
}

async fn wait_for_region(page: &Arc<Page>, region: Region, needle: &str) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if page.get(region).await.unwrap().html.contains(needle) {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting for '{}' in {}", needle, region.slug());
        }
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn genre_event_route_renders_grid() {
    let (app, page) = app_with_fake(FakeTmdb {
        discover: Some(vec![movie(7, "Seven", None, 8.6)]),
        ..Default::default()
    });

    let res = app
        .clone()
        .oneshot(
            Request::post("/events/genres/28")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);
    wait_for_region(&page, Region::Movies, r#"data-movie-id="7""#).await;

    let res = app
        .oneshot(Request::get("/regions/movies").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert!(body_text(res).await.contains("Rating: 8.6"));
}

#[tokio::test]
async fn index_renders_document_with_all_regions() {
    let (app, page) = app_with_fake(FakeTmdb::default());
    page.replace(Region::Rail(Category::Popular), "<p>pop</p>".to_string())
        .await;

    let res = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let html = body_text(res).await;
    for region in Region::ALL {
        assert!(html.contains(&format!(r#"id="{}""#, region.slug())));
    }
    assert!(html.contains("<p>pop</p>"));
    assert!(html.contains(r#"id="search""#));
}

async fn get_text(app: &axum::Router, path: &str) -> String {
    let res = app
        .clone()
        .oneshot(Request::get(path).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    body_text(res).await
}

#[tokio::test(start_paused = true)]
async fn late_search_result_still_reaches_document() {
    let (app, _page) = app_with_fake(FakeTmdb {
        search: Some(vec![movie(603, "The Matrix", None, 8.2)]),
        search_delay: Some(Duration::from_millis(150)),
        ..Default::default()
    });
    assert_eq!(get_text(&app, "/version").await, "0");

    let res = app
        .clone()
        .oneshot(
            Request::post("/events/search?q=matrix")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::ACCEPTED);

    // quiet period elapsed, search still in flight
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert_eq!(get_text(&app, "/version").await, "0");
    let html = get_text(&app, "/").await;
    assert!(html.contains(r#"<ul id="dropdown" data-region="dropdown" hidden>"#));

    tokio::time::sleep(Duration::from_millis(200)).await;
    let version = get_text(&app, "/version").await;
    assert_ne!(version, "0");
    let html = get_text(&app, "/").await;
    assert!(html.contains(&format!(r#"<body data-version="{version}">"#)));
    assert!(html.contains(r#"<ul id="dropdown" data-region="dropdown">"#));
    assert!(html.contains(r#"data-movie-id="603""#));
}

#[tokio::test]
async fn unknown_region_is_not_found() {
    let (app, _page) = app_with_fake(FakeTmdb::default());
    let res = app
        .oneshot(Request::get("/regions/sidebar").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_is_ok() {
    let (app, _page) = app_with_fake(FakeTmdb::default());
    let res = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(body_text(res).await, "OK");
}
