use rand::Rng;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use super::data::{Category, Coordinates, Exif, Photo, MAX_RATING};

/// Errors raised while loading a photo catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed catalog {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("duplicate photo id '{0}' in catalog")]
    DuplicateId(String),
    #[error("photo '{id}' has rating {rating}, expected 0 to 5")]
    RatingOutOfRange { id: String, rating: u8 },
}

/// Outcome of [`Collection::upsert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    /// A new photo was prepended
    Created,
    /// An existing photo was replaced in place
    Updated,
}

/// The Collection holds every photo in the portfolio, in memory.
///
/// Order is significant: index 0 is the newest photo. Created photos are
/// prepended so the "Newest" feed never needs to sort. Every mutation bumps
/// `revision`, which derived feeds use as part of their cache key.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    photos: Vec<Photo>,
    revision: u64,
}

impl Collection {
    /// Build a collection, rejecting duplicate ids and invalid ratings
    pub fn new(photos: Vec<Photo>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(photos.len());
        for photo in &photos {
            if !seen.insert(photo.id.as_str()) {
                return Err(CatalogError::DuplicateId(photo.id.clone()));
            }
            if photo.rating > MAX_RATING {
                return Err(CatalogError::RatingOutOfRange {
                    id: photo.id.clone(),
                    rating: photo.rating,
                });
            }
        }

        Ok(Collection { photos, revision: 0 })
    }

    /// Load a catalog from a JSON array of photos
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let photos: Vec<Photo> = serde_json::from_str(&contents).map_err(|source| CatalogError::Json {
            path: path.to_path_buf(),
            source,
        })?;

        let collection = Self::new(photos)?;
        info!("📁 Loaded {} photos from {}", collection.len(), path.display());
        Ok(collection)
    }

    /// Get the default catalog location
    ///
    /// - Linux: ~/.local/share/lumina/photos.json
    /// - macOS: ~/Library/Application Support/lumina/photos.json
    /// - Windows: %APPDATA%\lumina\photos.json
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::data_dir().or_else(dirs::home_dir)?;
        path.push("lumina");
        path.push("photos.json");
        Some(path)
    }

    /// The built-in showcase collection: five hand-written photos followed by
    /// 25 variations scattered a few degrees around the originals.
    pub fn demo() -> Self {
        let base = base_photos();
        let mut rng = rand::rng();

        let generated: Vec<Photo> = (0..25)
            .map(|i| {
                let source = &base[i % base.len()];
                let mut photo = source.clone();
                photo.id = format!("gen-{}", i);
                photo.title = format!("{} {}", source.title, i + 1);
                photo.url = format!(
                    "https://picsum.photos/id/{}/800/{}",
                    (i * 13) % 100 + 10,
                    if i % 2 == 0 { 600 } else { 800 }
                );
                photo.exif.coordinates = source.exif.coordinates.map(|c| {
                    Coordinates::new(
                        c.latitude + (rng.random::<f64>() - 0.5) * 10.0,
                        c.longitude + (rng.random::<f64>() - 0.5) * 10.0,
                    )
                });
                photo
            })
            .collect();

        let mut photos = base;
        photos.extend(generated);
        Collection { photos, revision: 0 }
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Mutation counter, bumped by every upsert and successful remove
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn get(&self, id: &str) -> Option<&Photo> {
        self.photos.iter().find(|p| p.id == id)
    }

    /// Replace the photo with the same id, or prepend it as the newest photo
    pub fn upsert(&mut self, photo: Photo) -> Upsert {
        self.revision += 1;

        if let Some(existing) = self.photos.iter_mut().find(|p| p.id == photo.id) {
            debug!("Updated photo {}", photo.id);
            *existing = photo;
            Upsert::Updated
        } else {
            debug!("Created photo {}", photo.id);
            self.photos.insert(0, photo);
            Upsert::Created
        }
    }

    /// Remove a photo by id, returning it if it was present
    pub fn remove(&mut self, id: &str) -> Option<Photo> {
        let index = self.photos.iter().position(|p| p.id == id)?;
        self.revision += 1;
        debug!("Removed photo {}", id);
        Some(self.photos.remove(index))
    }
}

fn base_photos() -> Vec<Photo> {
    #[allow(clippy::too_many_arguments)]
    fn photo(
        id: &str,
        url: &str,
        title: &str,
        category: Category,
        (width, height): (u32, u32),
        rating: u8,
        (camera, lens, focal_length): (&str, &str, &str),
        (aperture, shutter_speed, iso): (&str, &str, &str),
        (location, date): (&str, &str),
        coordinates: Coordinates,
    ) -> Photo {
        Photo {
            id: id.to_string(),
            url: url.to_string(),
            title: title.to_string(),
            category,
            width,
            height,
            rating,
            exif: Exif {
                camera: camera.to_string(),
                lens: lens.to_string(),
                aperture: aperture.to_string(),
                shutter_speed: shutter_speed.to_string(),
                iso: iso.to_string(),
                focal_length: focal_length.to_string(),
                location: location.to_string(),
                date: date.to_string(),
                coordinates: Some(coordinates),
            },
        }
    }

    vec![
        photo(
            "1",
            "https://picsum.photos/id/16/800/600",
            "Misty Mountains",
            Category::Landscape,
            (800, 600),
            5,
            ("Leica M11", "Summilux 35mm", "35mm"),
            ("f/5.6", "1/250s", "100"),
            ("Alps, Switzerland", "2023-10-12"),
            Coordinates::new(46.8182, 8.2275),
        ),
        photo(
            "2",
            "https://picsum.photos/id/45/600/800",
            "Urban Solitude",
            Category::Street,
            (600, 800),
            4,
            ("Fujifilm X-T5", "23mm f/1.4", "23mm"),
            ("f/2.0", "1/60s", "800"),
            ("Shinjuku, Tokyo", "2023-11-05"),
            Coordinates::new(35.6938, 139.7034),
        ),
        photo(
            "3",
            "https://picsum.photos/id/64/800/800",
            "Silent Gaze",
            Category::Portrait,
            (800, 800),
            5,
            ("Sony A7RV", "85mm GM", "85mm"),
            ("f/1.2", "1/1000s", "100"),
            ("Studio A, New York", "2023-09-20"),
            Coordinates::new(40.7128, -74.0060),
        ),
        photo(
            "4",
            "https://picsum.photos/id/28/900/600",
            "Deep Forest",
            Category::Landscape,
            (900, 600),
            4,
            ("Canon R5", "15-35mm", "15mm"),
            ("f/8", "1/4s", "50"),
            ("Oregon, USA", "2023-08-15"),
            Coordinates::new(43.8041, -120.5542),
        ),
        photo(
            "5",
            "https://picsum.photos/id/106/800/600",
            "Neon Rain",
            Category::Macro,
            (800, 600),
            3,
            ("Nikon Z8", "105mm Macro", "105mm"),
            ("f/4", "1/200s", "400"),
            ("London, UK", "2023-12-01"),
            Coordinates::new(51.5074, -0.1278),
        ),
    ]
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Minimal photo for tests across the crate
    pub(crate) fn photo(id: &str, rating: u8) -> Photo {
        Photo {
            id: id.to_string(),
            url: format!("{}.jpg", id),
            title: format!("Photo {}", id),
            category: Category::Landscape,
            width: 800,
            height: 600,
            rating,
            exif: Exif::default(),
        }
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = Collection::new(vec![photo("a", 1), photo("a", 2)]);
        assert!(matches!(result, Err(CatalogError::DuplicateId(id)) if id == "a"));
    }

    #[test]
    fn test_rating_out_of_range_rejected() {
        let result = Collection::new(vec![photo("ok", 5), photo("bad", 9)]);
        assert!(matches!(
            result,
            Err(CatalogError::RatingOutOfRange { id, rating: 9 }) if id == "bad"
        ));
    }

    #[test]
    fn test_load_rejects_rating_above_five() {
        let path = std::env::temp_dir().join(format!("lumina-rating-{}.json", std::process::id()));
        let mut photos = vec![photo("x", 5), photo("y", 5)];
        photos[0].rating = 9;
        std::fs::write(&path, serde_json::to_string(&photos).unwrap()).unwrap();

        let result = Collection::load(&path);
        std::fs::remove_file(&path).ok();

        assert!(matches!(result, Err(CatalogError::RatingOutOfRange { rating: 9, .. })));
    }

    #[test]
    fn test_upsert_prepends_new_photo() {
        let mut collection = Collection::new(vec![photo("a", 1), photo("b", 2)]).unwrap();
        assert_eq!(collection.upsert(photo("c", 3)), Upsert::Created);

        let ids: Vec<&str> = collection.photos().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut collection = Collection::new(vec![photo("a", 1), photo("b", 2)]).unwrap();
        assert_eq!(collection.upsert(photo("b", 5)), Upsert::Updated);

        let ids: Vec<&str> = collection.photos().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(collection.get("b").unwrap().rating, 5);
    }

    #[test]
    fn test_revision_tracks_mutations() {
        let mut collection = Collection::new(vec![photo("a", 1)]).unwrap();
        assert_eq!(collection.revision(), 0);

        collection.upsert(photo("b", 1));
        assert_eq!(collection.revision(), 1);

        assert!(collection.remove("missing").is_none());
        assert_eq!(collection.revision(), 1);

        assert!(collection.remove("a").is_some());
        assert_eq!(collection.revision(), 2);
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn test_demo_collection() {
        let collection = Collection::demo();
        assert_eq!(collection.len(), 30);
        assert!(collection.photos().iter().all(|p| p.coordinates().is_some()));

        let unique: HashSet<&str> = collection.photos().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(unique.len(), collection.len());
    }

    #[test]
    fn test_load_missing_file() {
        let result = Collection::load(Path::new("/nonexistent/lumina/photos.json"));
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }

    #[test]
    fn test_load_round_trip() {
        let path = std::env::temp_dir().join(format!("lumina-catalog-{}.json", std::process::id()));
        let photos = Collection::demo().photos()[..5].to_vec();
        std::fs::write(&path, serde_json::to_string(&photos).unwrap()).unwrap();

        let loaded = Collection::load(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.len(), photos.len());
        for (loaded, original) in loaded.photos().iter().zip(&photos) {
            assert_eq!(loaded.id, original.id);
            assert_eq!(loaded.exif.camera, original.exif.camera);
            let (a, b) = (loaded.coordinates().unwrap(), original.coordinates().unwrap());
            assert!((a.latitude - b.latitude).abs() < 1e-9);
            assert!((a.longitude - b.longitude).abs() < 1e-9);
        }
    }
}
