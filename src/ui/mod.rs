/// Widgets of the portfolio window
///
/// - `grid.rs` - photo cards, sentinel row, detail panel
/// - `map.rs` - world overview canvas

pub mod grid;
pub mod map;

use iced::widget::button;
use iced::Theme;

/// Button style for toolbar toggles: filled when active, plain otherwise
pub fn toggle_style(active: bool) -> fn(&Theme, button::Status) -> button::Style {
    if active {
        button::primary
    } else {
        button::text
    }
}
