//! Artist catalog
//!
//! Fixed, hard-coded artists partitioned into named groups. Choices are a
//! closed set, so selection is a lookup rather than validation.

use moodtunes_common::ArtistSelection;
use serde::Serialize;

const TAMIL_ARTISTS: [&str; 8] = [
    "A.R. Rahman",
    "Anirudh Ravichander",
    "Harris Jayaraj",
    "Yuvan Shankar Raja",
    "Santhosh Narayanan",
    "D. Imman",
    "Ghibran",
    "Hip Hop Tamizha",
];

const HINDI_ARTISTS: [&str; 8] = [
    "Arijit Singh",
    "Shreya Ghoshal",
    "Rahat Fateh Ali Khan",
    "Atif Aslam",
    "Armaan Malik",
    "Neha Kakkar",
    "Yo Yo Honey Singh",
    "Badshah",
];

/// One named group of artists
#[derive(Debug, Clone, Serialize)]
pub struct ArtistGroup {
    pub name: &'static str,
    pub artists: &'static [&'static str],
}

/// All selectable artists
#[derive(Debug, Clone, Serialize)]
pub struct ArtistCatalog {
    groups: Vec<ArtistGroup>,
}

impl ArtistCatalog {
    pub fn new() -> Self {
        Self {
            groups: vec![
                ArtistGroup {
                    name: "Tamil",
                    artists: &TAMIL_ARTISTS,
                },
                ArtistGroup {
                    name: "Hindi",
                    artists: &HINDI_ARTISTS,
                },
            ],
        }
    }

    pub fn groups(&self) -> &[ArtistGroup] {
        &self.groups
    }

    /// Resolve a clicked entry to a selection
    ///
    /// Exact name match; `None` for anything outside the catalog.
    pub fn select(&self, name: &str) -> Option<ArtistSelection> {
        let name = name.trim();
        self.groups.iter().find_map(|group| {
            group
                .artists
                .iter()
                .find(|artist| **artist == name)
                .map(|artist| ArtistSelection::new(*artist, group.name))
        })
    }
}

impl Default for ArtistCatalog {
    fn default() -> Self {
        Self::new()
    }
}
