use std::fmt;

use crate::state::data::{Category, Photo};

/// Category selector of the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
    /// Landscape or square framing
    Horizontal,
    /// Portrait framing
    Vertical,
}

impl CategoryFilter {
    /// Every selectable filter, in toolbar order
    pub fn options() -> Vec<CategoryFilter> {
        let mut options = vec![CategoryFilter::All];
        options.extend(Category::ALL.iter().copied().map(CategoryFilter::Only));
        options.push(CategoryFilter::Horizontal);
        options.push(CategoryFilter::Vertical);
        options
    }

    pub fn matches(&self, photo: &Photo) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(category) => photo.category == *category,
            CategoryFilter::Horizontal => photo.is_horizontal(),
            CategoryFilter::Vertical => photo.is_vertical(),
        }
    }
}

impl fmt::Display for CategoryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CategoryFilter::All => f.write_str("All"),
            CategoryFilter::Only(category) => fmt::Display::fmt(category, f),
            CategoryFilter::Horizontal => f.write_str("Horizontal"),
            CategoryFilter::Vertical => f.write_str("Vertical"),
        }
    }
}

/// Keep the photos matching `filter`, preserving collection order
pub fn filter_photos<'a>(photos: &'a [Photo], filter: CategoryFilter) -> Vec<&'a Photo> {
    photos.iter().filter(|p| filter.matches(p)).collect()
}
