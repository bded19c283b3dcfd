/// Ordering policies of the feed tabs

use rand::seq::SliceRandom;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::geo::distance_km;
use crate::state::data::{Coordinates, Photo};

/// Distance assigned to photos without coordinates in the Nearby and
/// Faraway tabs. Larger than any distance on Earth, so untagged photos rank
/// last; they are also kept last when the order is reversed.
pub const MISSING_DISTANCE_KM: f64 = 99_999.0;

/// Lowest rating that makes it into the Curated tab
pub const CURATED_MIN_RATING: u8 = 4;

/// The active feed tab, which decides selection and order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Tab {
    /// Four and five star photos, best first
    Curated,
    /// Collection order (newest first)
    #[default]
    Newest,
    /// A fresh shuffle every time the tab is picked
    Random,
    /// Closest to the user first
    Nearby,
    /// Farthest from the user first
    Faraway,
}

#[derive(Debug, Error, PartialEq)]
#[error("unknown feed tab '{0}'")]
pub struct UnknownTab(pub String);

impl Tab {
    pub const ALL: [Tab; 5] = [Tab::Curated, Tab::Newest, Tab::Random, Tab::Nearby, Tab::Faraway];

    pub fn name(&self) -> &'static str {
        match self {
            Tab::Curated => "curated",
            Tab::Newest => "newest",
            Tab::Random => "random",
            Tab::Nearby => "nearby",
            Tab::Faraway => "faraway",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Curated => "Curated",
            Tab::Newest => "Newest",
            Tab::Random => "Random",
            Tab::Nearby => "Nearby",
            Tab::Faraway => "Faraway",
        }
    }

    /// Nearby and Faraway need the user's position
    pub fn needs_location(&self) -> bool {
        matches!(self, Tab::Nearby | Tab::Faraway)
    }

    /// Parse a tab name, treating anything unrecognized as Newest
    /// (no reordering).
    pub fn parse_lenient(name: &str) -> Tab {
        name.parse().unwrap_or_else(|err: UnknownTab| {
            tracing::warn!("{}, keeping collection order", err);
            Tab::Newest
        })
    }
}

impl FromStr for Tab {
    type Err = UnknownTab;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Tab::ALL
            .iter()
            .copied()
            .find(|tab| tab.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownTab(s.to_string()))
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Order filtered photos according to `tab`
///
/// The input is consumed and a new vector returned; the collection itself is
/// never touched. Nearby and Faraway keep the input order when
/// `user_location` is unknown.
pub fn sort_photos<'a>(photos: Vec<&'a Photo>, tab: Tab, user_location: Option<Coordinates>) -> Vec<&'a Photo> {
    match tab {
        Tab::Curated => curated(photos),
        Tab::Newest => photos,
        Tab::Random => shuffled(photos),
        Tab::Nearby | Tab::Faraway => match user_location {
            Some(origin) => by_distance(photos, origin, tab == Tab::Faraway),
            None => photos,
        },
    }
}

fn curated(photos: Vec<&Photo>) -> Vec<&Photo> {
    let mut result: Vec<&Photo> = photos.into_iter().filter(|p| p.rating >= CURATED_MIN_RATING).collect();
    // sort_by is stable: equal ratings keep their collection order
    result.sort_by(|a, b| b.rating.cmp(&a.rating));
    result
}

fn shuffled(mut photos: Vec<&Photo>) -> Vec<&Photo> {
    photos.shuffle(&mut rand::rng());
    photos
}

fn by_distance<'a>(photos: Vec<&'a Photo>, origin: Coordinates, farthest_first: bool) -> Vec<&'a Photo> {
    let mut keyed: Vec<(bool, f64, &Photo)> = photos
        .into_iter()
        .map(|p| match p.coordinates() {
            Some(c) => (false, distance_km(origin, c), p),
            None => (true, MISSING_DISTANCE_KM, p),
        })
        .collect();

    keyed.sort_by(|(a_missing, a, _), (b_missing, b, _)| {
        a_missing.cmp(b_missing).then_with(|| {
            let ord = a.total_cmp(b);
            if farthest_first { ord.reverse() } else { ord }
        })
    });

    keyed.into_iter().map(|(_, _, p)| p).collect()
}
