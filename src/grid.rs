use iced::{Color, Point, Rectangle};

use crate::palette;

/// Medium lines fall on every fifth minor line, major lines on every fifth medium line.
pub const PITCH_RATIO: u32 = 5;

/// Snap increment and the three nested grid pitches of a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    minor: u32,
    snap: u32,
}

impl Grid {
    /// Zero values are raised to 1 so line generation always terminates.
    pub fn new(minor: u32, snap: u32) -> Self {
        Self {
            minor: minor.max(1),
            snap: snap.max(1),
        }
    }

    pub fn minor(&self) -> u32 {
        self.minor
    }

    pub fn medium(&self) -> u32 {
        self.minor * PITCH_RATIO
    }

    pub fn major(&self) -> u32 {
        self.medium() * PITCH_RATIO
    }

    pub fn snap_increment(&self) -> f32 {
        self.snap as f32
    }

    /// Grid lines needed to cover `viewport`, binned by salience.
    ///
    /// The viewport is rounded outward to the minor pitch and then grown by one
    /// more minor pitch on every side, so partially visible cells at the edges
    /// are always drawn. The axis lines are emitted in addition to whatever bin
    /// already holds the line at zero.
    pub fn lines_visible_in(&self, viewport: Rectangle) -> GridLines {
        let pitch = i64::from(self.minor);
        let medium = i64::from(self.medium());
        let major = i64::from(self.major());

        let (left, right) = expand(viewport.x, viewport.width, pitch);
        let (top, bottom) = expand(viewport.y, viewport.height, pitch);

        let mut lines = GridLines {
            minor: Vec::new(),
            medium: Vec::new(),
            major: Vec::new(),
            axis: [
                Line::new(Point::new(0.0, top as f32), Point::new(0.0, bottom as f32)),
                Line::new(Point::new(left as f32, 0.0), Point::new(right as f32, 0.0)),
            ],
        };

        let mut push = |coordinate: i64, line: Line| {
            if coordinate.rem_euclid(major) == 0 {
                lines.major.push(line);
            } else if coordinate.rem_euclid(medium) == 0 {
                lines.medium.push(line);
            } else {
                lines.minor.push(line);
            }
        };

        for x in (left..=right).step_by(pitch as usize) {
            let line = Line::new(
                Point::new(x as f32, top as f32),
                Point::new(x as f32, bottom as f32),
            );
            push(x, line);
        }
        for y in (top..=bottom).step_by(pitch as usize) {
            let line = Line::new(
                Point::new(left as f32, y as f32),
                Point::new(right as f32, y as f32),
            );
            push(y, line);
        }

        lines
    }
}

/// Outward-rounded span of `[start, start + length]`, padded by one pitch.
fn expand(start: f32, length: f32, pitch: i64) -> (i64, i64) {
    let pitch_f = pitch as f64;
    let start = f64::from(start);
    let end = start + f64::from(length.max(0.0));
    let first = (start / pitch_f).floor() as i64 - 1;
    let last = (end / pitch_f).ceil() as i64 + 1;
    (first * pitch, last * pitch)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line {
    pub from: Point,
    pub to: Point,
}

impl Line {
    pub fn new(from: Point, to: Point) -> Self {
        Self { from, to }
    }

    pub fn is_vertical(&self) -> bool {
        self.from.x == self.to.x
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GridLevel {
    Minor,
    Medium,
    Major,
    Axis,
}

impl GridLevel {
    pub fn color(self) -> Color {
        match self {
            GridLevel::Minor => palette::GRID_MINOR,
            GridLevel::Medium => palette::GRID_MEDIUM,
            GridLevel::Major => palette::GRID_MAJOR,
            GridLevel::Axis => palette::GRID_AXIS,
        }
    }

    /// Stroke width in screen pixels.
    pub fn width(self) -> f32 {
        match self {
            GridLevel::Minor => 1.0,
            GridLevel::Medium => 2.0,
            GridLevel::Major | GridLevel::Axis => 3.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GridLines {
    pub minor: Vec<Line>,
    pub medium: Vec<Line>,
    pub major: Vec<Line>,
    pub axis: [Line; 2],
}

impl GridLines {
    /// Bins in the order they must be painted: minor, medium, major, axis.
    pub fn in_paint_order(&self) -> [(GridLevel, &[Line]); 4] {
        [
            (GridLevel::Minor, self.minor.as_slice()),
            (GridLevel::Medium, self.medium.as_slice()),
            (GridLevel::Major, self.major.as_slice()),
            (GridLevel::Axis, self.axis.as_slice()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced::Size;

    fn xs(lines: &[Line]) -> Vec<f32> {
        lines
            .iter()
            .filter(|line| line.is_vertical())
            .map(|line| line.from.x)
            .collect()
    }

    #[test]
    fn pitches_are_nested() {
        let grid = Grid::new(20, 10);
        assert_eq!(grid.medium(), 100);
        assert_eq!(grid.major(), 500);
        assert_eq!(grid.snap_increment(), 10.0);
    }

    #[test]
    fn origin_is_in_major_and_axis_bins() {
        let grid = Grid::new(20, 10);
        let lines = grid.lines_visible_in(Rectangle::new(Point::ORIGIN, Size::new(100.0, 100.0)));

        assert_eq!(xs(&lines.major), vec![0.0]);
        assert_eq!(xs(&lines.medium), vec![100.0]);
        assert_eq!(xs(&lines.minor), vec![-20.0, 20.0, 40.0, 60.0, 80.0, 120.0]);
        assert!(lines.axis[0].is_vertical());
        assert_eq!(lines.axis[0].from.x, 0.0);
        assert_eq!(lines.axis[1].from.y, 0.0);
    }

    #[test]
    fn viewport_is_expanded_outward() {
        let grid = Grid::new(20, 10);
        let lines = grid.lines_visible_in(Rectangle::new(Point::new(-35.0, 7.0), Size::new(50.0, 10.0)));

        let mut all: Vec<f32> = [&lines.minor, &lines.medium, &lines.major]
            .into_iter()
            .flat_map(|bin| xs(bin))
            .collect();
        all.sort_by(f32::total_cmp);
        assert_eq!(all, vec![-60.0, -40.0, -20.0, 0.0, 20.0, 40.0]);

        // Vertical lines span the expanded rectangle.
        assert_eq!(lines.axis[0].from.y, -20.0);
        assert_eq!(lines.axis[0].to.y, 40.0);
    }

    #[test]
    fn negative_coordinates_classify_like_positive_ones() {
        let grid = Grid::new(20, 10);
        let lines = grid.lines_visible_in(Rectangle::new(Point::new(-520.0, -520.0), Size::new(40.0, 40.0)));
        assert!(xs(&lines.major).contains(&-500.0));
        assert!(!xs(&lines.minor).contains(&-500.0));
    }

    #[test]
    fn paint_order_ends_with_axis() {
        let grid = Grid::new(20, 10);
        let lines = grid.lines_visible_in(Rectangle::new(Point::ORIGIN, Size::new(10.0, 10.0)));
        let order: Vec<GridLevel> = lines.in_paint_order().iter().map(|(level, _)| *level).collect();
        assert_eq!(
            order,
            vec![GridLevel::Minor, GridLevel::Medium, GridLevel::Major, GridLevel::Axis]
        );
    }
}
