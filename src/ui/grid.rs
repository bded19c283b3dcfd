/// Grid cards, the trailing sentinel and the photo detail panel
use iced::widget::{button, column, container, image, row, text, Space};
use iced::{Alignment, Element, Length};
use iced_aw::Wrap;

use crate::feed::Neighbors;
use crate::state::data::{Photo, MAX_RATING};
use crate::Message;

/// Card width in the grid
const CARD_WIDTH: f32 = 260.0;

/// Whether the trailing sentinel is on screen.
///
/// The sentinel sits below the last card, so it is visible once the
/// viewport is scrolled past `threshold` of the scrollable range, or when
/// the content is not tall enough to scroll at all.
pub fn sentinel_visible(relative_y: f32, viewport_height: f32, content_height: f32, threshold: f32) -> bool {
    content_height <= viewport_height || relative_y >= threshold
}

/// Remote images are not downloaded; only local files are decoded.
fn is_local(url: &str) -> bool {
    !(url.starts_with("http://") || url.starts_with("https://"))
}

fn picture<'a>(photo: &Photo, width: f32) -> Element<'a, Message> {
    if is_local(&photo.url) {
        image(image::Handle::from_path(&photo.url)).width(Length::Fixed(width)).into()
    } else {
        let height = width * photo.height as f32 / photo.width.max(1) as f32;
        container(text(format!("{} × {}", photo.width, photo.height)).size(12))
            .width(Length::Fixed(width))
            .height(Length::Fixed(height))
            .center_x(Length::Fixed(width))
            .center_y(Length::Fixed(height))
            .style(container::rounded_box)
            .into()
    }
}

fn stars(rating: u8) -> String {
    (0..MAX_RATING).map(|i| if i < rating { '★' } else { '☆' }).collect()
}

/// Delete button, or the confirmation row once it was pressed
fn delete_controls<'a>(photo: &'a Photo, confirming: bool) -> Element<'a, Message> {
    if confirming {
        row![
            text("Delete permanently?").size(12),
            button(text("Delete").size(12))
                .on_press(Message::ConfirmDelete)
                .style(button::danger)
                .padding(4),
            button(text("Cancel").size(12))
                .on_press(Message::CancelDelete)
                .style(button::secondary)
                .padding(4),
        ]
        .spacing(4)
        .align_y(Alignment::Center)
        .into()
    } else {
        button(text("Delete").size(12))
            .on_press(Message::DeletePhoto(photo.id.clone()))
            .style(button::danger)
            .padding(4)
            .into()
    }
}

fn card<'a>(photo: &'a Photo, managing: bool, pending_delete: Option<&str>) -> Element<'a, Message> {
    let body = column![
        picture(photo, CARD_WIDTH),
        text(&photo.title).size(16),
        text(format!("{} · {}", photo.category, stars(photo.rating))).size(12),
    ]
    .spacing(6);

    if managing {
        // Edit controls replace the click-to-open behaviour
        let rating_buttons = (0..=MAX_RATING).fold(row![].spacing(2), |r, value| {
            r.push(
                button(text(value.to_string()).size(12))
                    .on_press(Message::RatePhoto(photo.id.clone(), value))
                    .style(super::toggle_style(value == photo.rating))
                    .padding(4),
            )
        });

        column![
            body,
            rating_buttons,
            delete_controls(photo, pending_delete == Some(photo.id.as_str())),
        ]
        .spacing(6)
        .width(Length::Fixed(CARD_WIDTH))
        .into()
    } else {
        button(body)
            .on_press(Message::OpenPhoto(photo.id.clone()))
            .style(button::text)
            .padding(0)
            .into()
    }
}

/// The visible prefix of the feed followed by the sentinel row
pub fn grid<'a>(
    photos: &'a [Photo],
    managing: bool,
    pending_delete: Option<&str>,
    complete: bool,
) -> Element<'a, Message> {
    let cards: Vec<Element<'a, Message>> = photos.iter().map(|p| card(p, managing, pending_delete)).collect();

    let sentinel: Element<'a, Message> = if complete {
        Space::with_height(Length::Fixed(20.0)).into()
    } else {
        container(text("Loading...").size(12))
            .height(Length::Fixed(80.0))
            .center_x(Length::Fill)
            .center_y(Length::Fixed(80.0))
            .into()
    };

    column![Wrap::with_elements(cards).spacing(16.0).line_spacing(16.0), sentinel]
        .spacing(16)
        .width(Length::Fill)
        .into()
}

/// Shown instead of the grid when the feed is empty
pub fn empty_state<'a>() -> Element<'a, Message> {
    container(text("No photos in this category yet.").size(16))
        .width(Length::Fill)
        .padding(80)
        .center_x(Length::Fill)
        .into()
}

/// Full photo with capture details and previous/next navigation
pub fn detail<'a>(photo: &'a Photo, neighbors: Option<&Neighbors>, feed_len: usize) -> Element<'a, Message> {
    let exif = &photo.exif;
    let mut info = column![
        text(&photo.title).size(28),
        text(format!("{} · {}", photo.category, stars(photo.rating))).size(14),
        text(format!("{} · {}", exif.camera, exif.lens)).size(14),
        text(format!(
            "{} · {} · {} · ISO {}",
            exif.focal_length, exif.aperture, exif.shutter_speed, exif.iso
        ))
        .size(14),
        text(format!("{} · {}", exif.location, exif.date)).size(14),
    ]
    .spacing(8);

    if let Some(c) = exif.coordinates {
        info = info.push(text(format!("{:.4}, {:.4}", c.latitude, c.longitude)).size(12));
    }

    if let Some(n) = neighbors {
        info = info.push(text(format!("{} of {}", n.index + 1, feed_len)).size(12));
    }

    let has_previous = neighbors.is_some_and(Neighbors::has_previous);
    let has_next = neighbors.is_some_and(Neighbors::has_next);

    let navigation = row![
        button("‹ Previous").on_press_maybe(has_previous.then_some(Message::PreviousPhoto)),
        button("Close").on_press(Message::ClosePhoto),
        button("Next ›").on_press_maybe(has_next.then_some(Message::NextPhoto)),
    ]
    .spacing(12);

    column![picture(photo, 720.0), info, navigation]
        .spacing(20)
        .padding(24)
        .align_x(Alignment::Center)
        .width(Length::Fill)
        .into()
}
