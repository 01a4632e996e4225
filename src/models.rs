use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Genre {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    pub vote_average: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct MovieDetails {
    #[serde(flatten)]
    pub summary: MovieSummary,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub release_date: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Video {
    pub site: String,
    #[serde(rename = "type")]
    pub video_type: String,
    pub key: String,
}

impl Video {
    pub fn is_youtube_trailer(&self) -> bool {
        self.site == "YouTube" && self.video_type == "Trailer"
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenreList {
    pub genres: Vec<Genre>,
}

/// Single page of a TMDB listing. Only `results` is read.
#[derive(Debug, Clone, Deserialize)]
pub struct Paged<T> {
    pub results: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VideoList {
    pub results: Vec<Video>,
}
