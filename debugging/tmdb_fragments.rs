//! Run one query function against live TMDB and print the markup it renders.
//! Usage:
//!   cargo run --bin tmdb_fragments -- genres
//!   cargo run --bin tmdb_fragments -- rail <popular|top-rated|now-playing|upcoming>
//!   cargo run --bin tmdb_fragments -- genre <genre_id>
//!   cargo run --bin tmdb_fragments -- movie <tmdb_id>
//!   cargo run --bin tmdb_fragments -- search <query>
//! Requires TMDB_API_KEY in the environment (.env supported).

use anyhow::{anyhow, Context, Result};
use cinedeck::config::Config;
use cinedeck::discover::Discover;
use cinedeck::page::{Page, Region};
use cinedeck::tmdb::TmdbClient;
use dotenvy::dotenv;
use std::env;
use std::sync::Arc;

fn usage() -> ! {
    eprintln!("Usage: cargo run --bin tmdb_fragments -- genres");
    eprintln!("       cargo run --bin tmdb_fragments -- rail <popular|top-rated|now-playing|upcoming>");
    eprintln!("       cargo run --bin tmdb_fragments -- genre <genre_id>");
    eprintln!("       cargo run --bin tmdb_fragments -- movie <tmdb_id>");
    eprintln!("       cargo run --bin tmdb_fragments -- search <query>");
    std::process::exit(1);
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        usage();
    }

    let config = Config::from_env()?;
    let page = Arc::new(Page::full());
    let tmdb = Arc::new(TmdbClient::new(config.tmdb_base_url, config.tmdb_api_key));
    let discover = Discover::new(tmdb, page.clone());
    let arg = args.get(2).map(String::as_str);

    let region = match args[1].as_str() {
        "genres" => {
            discover.load_genres().await;
            Region::GenreList
        }
        "rail" => {
            let region = arg
                .and_then(Region::from_slug)
                .filter(|r| matches!(r, Region::Rail(_)))
                .ok_or_else(|| anyhow!("unknown rail"))?;
            if let Region::Rail(category) = region {
                discover.load_category(category).await;
            }
            region
        }
        "genre" => {
            let id: i64 = arg
                .ok_or_else(|| anyhow!("missing genre id"))?
                .parse()
                .context("genre id must be an integer")?;
            discover.load_movies_by_genre(id).await;
            Region::Movies
        }
        "movie" => {
            let id: i64 = arg
                .ok_or_else(|| anyhow!("missing movie id"))?
                .parse()
                .context("movie id must be an integer")?;
            if !discover.load_movie_details(id).await {
                return Err(anyhow!("details for movie {} could not be loaded", id));
            }
            Region::Modal
        }
        "search" => {
            let query = args[2..].join(" ");
            discover.handle_search(&query).await;
            Region::SearchDropdown
        }
        _ => usage(),
    };

    let state = page
        .get(region)
        .await
        .ok_or_else(|| anyhow!("page has no '{}' region", region.slug()))?;
    println!("<!-- {} (visible: {}) -->", region.slug(), state.visible);
    println!("{}", state.html);
    Ok(())
}
