/// Shared data structures for the application state
///
/// These structs represent the photo records that flow between
/// the catalog, the feed engine and the UI layer.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Concrete photo categories a record can be tagged with
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Landscape,
    Street,
    Portrait,
    Macro,
}

impl Category {
    pub const ALL: [Category; 4] = [
        Category::Landscape,
        Category::Street,
        Category::Portrait,
        Category::Macro,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Category::Landscape => "Landscape",
            Category::Street => "Street",
            Category::Portrait => "Portrait",
            Category::Macro => "Macro",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A point on the globe in degrees
///
/// Latitude and longitude travel together so a record can never
/// carry one without the other.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Capture metadata shown in the detail view
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(try_from = "ExifRecord", into = "ExifRecord")]
pub struct Exif {
    pub camera: String,
    pub lens: String,
    pub aperture: String,
    pub shutter_speed: String,
    pub iso: String,
    pub focal_length: String,
    /// Free-text place name (e.g. "Shinjuku, Tokyo")
    pub location: String,
    /// Capture date as entered (e.g. "2023-10-12")
    pub date: String,
    /// GPS position, `None` when the photo was not geotagged
    pub coordinates: Option<Coordinates>,
}

/// On-disk shape of [`Exif`]: catalog files keep `latitude` and
/// `longitude` as two optional sibling keys.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExifRecord {
    #[serde(default)]
    camera: String,
    #[serde(default)]
    lens: String,
    #[serde(default)]
    aperture: String,
    #[serde(default)]
    shutter_speed: String,
    #[serde(default)]
    iso: String,
    #[serde(default)]
    focal_length: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    longitude: Option<f64>,
}

impl TryFrom<ExifRecord> for Exif {
    type Error = String;

    fn try_from(record: ExifRecord) -> Result<Self, Self::Error> {
        let coordinates = match (record.latitude, record.longitude) {
            (Some(latitude), Some(longitude)) => Some(Coordinates { latitude, longitude }),
            (None, None) => None,
            _ => return Err("latitude and longitude must be given together".to_string()),
        };

        Ok(Exif {
            camera: record.camera,
            lens: record.lens,
            aperture: record.aperture,
            shutter_speed: record.shutter_speed,
            iso: record.iso,
            focal_length: record.focal_length,
            location: record.location,
            date: record.date,
            coordinates,
        })
    }
}

impl From<Exif> for ExifRecord {
    fn from(exif: Exif) -> Self {
        ExifRecord {
            latitude: exif.coordinates.map(|c| c.latitude),
            longitude: exif.coordinates.map(|c| c.longitude),
            camera: exif.camera,
            lens: exif.lens,
            aperture: exif.aperture,
            shutter_speed: exif.shutter_speed,
            iso: exif.iso,
            focal_length: exif.focal_length,
            location: exif.location,
            date: exif.date,
        }
    }
}

/// Highest star rating a photo can carry
pub const MAX_RATING: u8 = 5;

/// Represents a single photo in the portfolio
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Photo {
    /// Unique identifier within the collection
    pub id: String,
    /// Remote URL or local file path of the image
    pub url: String,
    pub title: String,
    pub category: Category,
    pub width: u32,
    pub height: u32,
    /// Star rating, 0 to 5
    #[serde(default)]
    pub rating: u8,
    pub exif: Exif,
}

impl Photo {
    pub fn coordinates(&self) -> Option<Coordinates> {
        self.exif.coordinates
    }

    /// Landscape or square framing
    pub fn is_horizontal(&self) -> bool {
        self.width >= self.height
    }

    pub fn is_vertical(&self) -> bool {
        self.height > self.width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_json(extra: &str) -> String {
        format!(
            r#"{{
                "id": "1", "url": "a.jpg", "title": "Misty", "category": "landscape",
                "width": 800, "height": 600, "rating": 5,
                "exif": {{ "camera": "Leica M11", "lens": "35mm", "aperture": "f/5.6",
                           "shutterSpeed": "1/250s", "iso": "100", "location": "Alps",
                           "date": "2023-10-12"{} }}
            }}"#,
            extra
        )
    }

    #[test]
    fn test_parse_with_coordinates() {
        let photo: Photo = serde_json::from_str(&sample_json(r#", "latitude": 46.8, "longitude": 8.2"#)).unwrap();
        assert_eq!(photo.coordinates(), Some(Coordinates::new(46.8, 8.2)));
        assert_eq!(photo.category, Category::Landscape);
        assert!(photo.is_horizontal());
    }

    #[test]
    fn test_parse_without_coordinates() {
        let photo: Photo = serde_json::from_str(&sample_json("")).unwrap();
        assert_eq!(photo.coordinates(), None);
    }

    #[test]
    fn test_half_coordinates_rejected() {
        let result: Result<Photo, _> = serde_json::from_str(&sample_json(r#", "latitude": 46.8"#));
        assert!(result.is_err());
    }

    #[test]
    fn test_square_counts_as_horizontal() {
        let mut photo: Photo = serde_json::from_str(&sample_json("")).unwrap();
        photo.width = 800;
        photo.height = 800;
        assert!(photo.is_horizontal());
        assert!(!photo.is_vertical());
    }
}
