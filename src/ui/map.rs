/// World overview of the feed
///
/// Plots every geotagged photo of the current feed on an equirectangular
/// grid. No tiles are drawn; this is a spatial overview, not a map
/// renderer. Clicking a marker opens the photo.
use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Path, Stroke};
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};

use crate::state::data::{Coordinates, Photo};
use crate::Message;

/// Marker radius in pixels
const MARKER_RADIUS: f32 = 5.0;

/// How far from a marker a click still hits it, in pixels
const HIT_RADIUS: f32 = 8.0;

/// Map data: one marker per geotagged photo
#[derive(Debug, Clone)]
pub struct MapOverview {
    markers: Vec<(String, Coordinates)>,
    user: Option<Coordinates>,
    dark: bool,
}

impl MapOverview {
    pub fn new(photos: &[Photo], user: Option<Coordinates>, dark: bool) -> Self {
        let markers = photos
            .iter()
            .filter_map(|p| p.coordinates().map(|c| (p.id.clone(), c)))
            .collect();
        Self { markers, user, dark }
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// Id of the marker closest to `point`, if within the hit radius
    pub fn hit_test(&self, point: Point, size: Size) -> Option<&str> {
        self.markers
            .iter()
            .map(|(id, c)| (id, project(*c, size).distance(point)))
            .filter(|(_, d)| *d <= HIT_RADIUS)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id.as_str())
    }
}

/// Equirectangular projection of a coordinate into a frame of `size`
pub fn project(c: Coordinates, size: Size) -> Point {
    let x = (c.longitude + 180.0) / 360.0 * size.width as f64;
    let y = (90.0 - c.latitude) / 180.0 * size.height as f64;
    Point::new(x as f32, y as f32)
}

impl canvas::Program<Message> for MapOverview {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let size = bounds.size();

        let (background, grid, marker) = if self.dark {
            (Color::from_rgb(0.05, 0.06, 0.1), Color::from_rgba(1.0, 1.0, 1.0, 0.08), Color::from_rgba(1.0, 1.0, 1.0, 0.8))
        } else {
            (Color::from_rgb(0.96, 0.97, 0.98), Color::from_rgba(0.0, 0.0, 0.0, 0.08), Color::from_rgba(0.0, 0.0, 0.0, 0.8))
        };

        frame.fill_rectangle(Point::ORIGIN, size, background);

        // Graticule every 30 degrees
        let mut path_builder = canvas::path::Builder::new();
        for lon in (-180..=180).step_by(30) {
            let top = project(Coordinates::new(90.0, lon as f64), size);
            let bottom = project(Coordinates::new(-90.0, lon as f64), size);
            path_builder.move_to(top);
            path_builder.line_to(bottom);
        }
        for lat in (-90..=90).step_by(30) {
            let left = project(Coordinates::new(lat as f64, -180.0), size);
            let right = project(Coordinates::new(lat as f64, 180.0), size);
            path_builder.move_to(left);
            path_builder.line_to(right);
        }
        frame.stroke(&path_builder.build(), Stroke::default().with_color(grid).with_width(1.0));

        for (_, c) in &self.markers {
            frame.fill(&Path::circle(project(*c, size), MARKER_RADIUS), marker);
        }

        if let Some(user) = self.user {
            let position = project(user, size);
            frame.fill(&Path::circle(position, MARKER_RADIUS), Color::from_rgb(0.55, 0.36, 0.96));
            frame.stroke(
                &Path::circle(position, MARKER_RADIUS * 2.0),
                Stroke::default()
                    .with_color(Color::from_rgba(0.55, 0.36, 0.96, 0.5))
                    .with_width(2.0),
            );
        }

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        _state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        if let canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) = event {
            if let Some(position) = cursor.position_in(bounds) {
                if let Some(id) = self.hit_test(position, bounds.size()) {
                    return (canvas::event::Status::Captured, Some(Message::OpenPhoto(id.to_string())));
                }
            }
        }

        (canvas::event::Status::Ignored, None)
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        match cursor.position_in(bounds) {
            Some(position) if self.hit_test(position, bounds.size()).is_some() => mouse::Interaction::Pointer,
            _ => mouse::Interaction::default(),
        }
    }
}
