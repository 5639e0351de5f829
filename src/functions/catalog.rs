use super::MovieLookup;
use crate::core::error::ReelError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Showtime {
    pub location: String,
    pub theater: String,
    #[serde(default)]
    pub times: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f32>,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movie {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub showtimes: Vec<Showtime>,
    #[serde(default)]
    pub reviews: Vec<Review>,
}

/// In-memory movie data answering the lookup functions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MovieCatalog {
    #[serde(default)]
    pub movies: Vec<Movie>,
}

impl MovieCatalog {
    pub fn from_yaml(contents: &str) -> Result<Self, ReelError> {
        Ok(serde_yml::from_str(contents)?)
    }

    pub fn load(path: &Path) -> Result<Self, ReelError> {
        let contents = fs::read_to_string(path)?;
        let catalog = Self::from_yaml(&contents)
            .map_err(|e| ReelError::Config(format!("Parse {}: {}", path.display(), e)))?;
        tracing::info!(movies = catalog.movies.len(), path = %path.display(), "loaded movie catalog");
        Ok(catalog)
    }

    /// Matches an id exactly, then a title ignoring case: whole title first,
    /// then a title prefix, then anywhere in the title.
    pub fn find(&self, id_or_title: &str) -> Option<&Movie> {
        let needle = id_or_title.trim();
        if needle.is_empty() {
            return None;
        }
        let movies = &self.movies;
        let lowered = needle.to_lowercase();
        let by_title = move |matches: fn(&str, &str) -> bool| {
            movies
                .iter()
                .find(|m| matches(&m.title.to_lowercase(), &lowered))
        };

        self.movies
            .iter()
            .find(|m| m.id == needle)
            .or_else(|| by_title(|title, needle| title == needle))
            .or_else(|| by_title(|title, needle| title.starts_with(needle)))
            .or_else(|| by_title(|title, needle| title.contains(needle)))
    }

    fn require(&self, id_or_title: &str) -> Result<&Movie, ReelError> {
        self.find(id_or_title).ok_or_else(|| {
            ReelError::Lookup(format!("no movie matching '{}' is playing", id_or_title.trim()))
        })
    }

    /// Small catalog used when no catalog file is configured.
    pub fn sample() -> Self {
        fn times(ts: &[&str]) -> Vec<String> {
            ts.iter().map(|t| t.to_string()).collect()
        }

        Self {
            movies: vec![
                Movie {
                    id: "693134".to_string(),
                    title: "Dune: Part Two".to_string(),
                    overview: "Paul Atreides unites with the Fremen on a path of revenge."
                        .to_string(),
                    showtimes: vec![
                        Showtime {
                            location: "94110".to_string(),
                            theater: "Alamo Drafthouse New Mission".to_string(),
                            times: times(&["13:15", "16:40", "20:05"]),
                        },
                        Showtime {
                            location: "10001".to_string(),
                            theater: "AMC 34th Street 14".to_string(),
                            times: times(&["12:00", "19:30"]),
                        },
                    ],
                    reviews: vec![
                        Review {
                            author: "Harper".to_string(),
                            rating: Some(9.0),
                            content: "Enormous in every sense, and the sound design rattles the seats."
                                .to_string(),
                        },
                        Review {
                            author: "Jules".to_string(),
                            rating: Some(7.5),
                            content: "Gorgeous, if a little long in the middle.".to_string(),
                        },
                    ],
                },
                Movie {
                    id: "1022789".to_string(),
                    title: "Inside Out 2".to_string(),
                    overview: "Riley's emotions make room for some unexpected new arrivals."
                        .to_string(),
                    showtimes: vec![Showtime {
                        location: "94110".to_string(),
                        theater: "Roxie Theater".to_string(),
                        times: times(&["11:00", "14:30"]),
                    }],
                    reviews: vec![Review {
                        author: "Sam".to_string(),
                        rating: Some(8.0),
                        content: "Anxiety steals the show.".to_string(),
                    }],
                },
                Movie {
                    id: "718821".to_string(),
                    title: "Twisters".to_string(),
                    overview: "Storm chasers converge on Oklahoma during a record season."
                        .to_string(),
                    showtimes: vec![Showtime {
                        location: "10001".to_string(),
                        theater: "Regal Union Square".to_string(),
                        times: times(&["18:45", "21:50"]),
                    }],
                    reviews: Vec::new(),
                },
            ],
        }
    }
}

fn format_reviews(out: &mut String, movie: &Movie) {
    if movie.reviews.is_empty() {
        let _ = writeln!(out, "No reviews yet for {}.", movie.title);
        return;
    }
    let _ = writeln!(out, "Reviews for {}:", movie.title);
    for review in &movie.reviews {
        match review.rating {
            Some(rating) => {
                let _ = writeln!(out, "- {} ({}/10): {}", review.author, rating, review.content);
            }
            None => {
                let _ = writeln!(out, "- {}: {}", review.author, review.content);
            }
        }
    }
}

#[async_trait]
impl MovieLookup for MovieCatalog {
    async fn now_playing(&self) -> Result<String, ReelError> {
        if self.movies.is_empty() {
            return Ok("Nothing is playing right now.".to_string());
        }
        let mut out = String::from("Now playing:\n");
        for movie in &self.movies {
            let _ = write!(out, "- {} (id {})", movie.title, movie.id);
            if !movie.overview.is_empty() {
                let _ = write!(out, ": {}", movie.overview);
            }
            out.push('\n');
        }
        Ok(out.trim_end().to_string())
    }

    async fn showtimes(&self, title: &str, location: &str) -> Result<String, ReelError> {
        let movie = self.require(title)?;
        let location = location.trim();
        let matching: Vec<&Showtime> = movie
            .showtimes
            .iter()
            .filter(|s| s.location.eq_ignore_ascii_case(location))
            .collect();

        if matching.is_empty() {
            return Ok(format!("No showtimes for {} near {}.", movie.title, location));
        }

        let mut out = format!("Showtimes for {} near {}:\n", movie.title, location);
        for showtime in matching {
            let _ = writeln!(out, "- {}: {}", showtime.theater, showtime.times.join(", "));
        }
        Ok(out.trim_end().to_string())
    }

    async fn reviews(&self, movie_id: Option<&str>) -> Result<String, ReelError> {
        let mut out = String::new();
        match movie_id {
            Some(id) => format_reviews(&mut out, self.require(id)?),
            None => {
                for movie in &self.movies {
                    format_reviews(&mut out, movie);
                }
            }
        }
        if out.is_empty() {
            out.push_str("No reviews available.");
        }
        Ok(out.trim_end().to_string())
    }
}
