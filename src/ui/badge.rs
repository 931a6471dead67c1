/// Selection badge
///
/// Small canvas-drawn indicator layered over a cell's corner while the
/// grid is in editing mode: an outlined circle when unselected, a filled
/// circle with a checkmark when selected.

use iced::mouse;
use iced::widget::canvas::{self, Path, Stroke};
use iced::{Color, Point, Rectangle, Renderer, Theme};

#[derive(Debug, Clone, Copy)]
pub struct SelectionBadge {
    pub selected: bool,
}

impl<Message> canvas::Program<Message> for SelectionBadge {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        let center = Point::new(bounds.width / 2.0, bounds.height / 2.0);
        let radius = bounds.width.min(bounds.height) / 2.0 - 1.0;

        if self.selected {
            frame.fill(
                &Path::circle(center, radius),
                Color::from_rgb(0.0, 0.48, 1.0),
            );

            let mut check = canvas::path::Builder::new();
            check.move_to(Point::new(center.x - radius * 0.45, center.y + radius * 0.05));
            check.line_to(Point::new(center.x - radius * 0.1, center.y + radius * 0.4));
            check.line_to(Point::new(center.x + radius * 0.5, center.y - radius * 0.3));
            frame.stroke(
                &check.build(),
                Stroke::default().with_color(Color::WHITE).with_width(2.0),
            );
        } else {
            frame.stroke(
                &Path::circle(center, radius),
                Stroke::default().with_color(Color::WHITE).with_width(1.5),
            );
        }

        vec![frame.into_geometry()]
    }
}
