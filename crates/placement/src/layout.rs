//! Hole and connector layout arithmetic.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

use crate::error::PlacementError;
use crate::measure::{check_finite, check_positive};

/// Rectangular board outline, centred on its own origin.
/// `width` runs along x, `length` along y; the front edge is at -y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardOutline {
    pub width: f64,
    pub length: f64,
}

impl BoardOutline {
    pub fn new(width: f64, length: f64) -> Result<Self, PlacementError> {
        check_positive("board_width", width)?;
        check_positive("board_length", length)?;
        Ok(Self { width, length })
    }
}

/// Which corner a mounting hole sits in.
///
/// The board and the enclosure pillars are built independently; both sides
/// agree on which hole is which purely through this label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
}

impl Corner {
    /// Fixed output order of [`board_hole_locations`].
    pub const ORDER: [Corner; 4] = [
        Corner::FrontLeft,
        Corner::FrontRight,
        Corner::RearLeft,
        Corner::RearRight,
    ];

    /// Sign of the corner along (x, y).
    fn signs(self) -> (f64, f64) {
        match self {
            Corner::FrontLeft => (-1.0, -1.0),
            Corner::FrontRight => (1.0, -1.0),
            Corner::RearLeft => (-1.0, 1.0),
            Corner::RearRight => (1.0, 1.0),
        }
    }
}

/// A labelled mounting-hole centre.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerHole {
    pub corner: Corner,
    pub center: Point2<f64>,
}

/// The four corner mounting holes, `inset` from each edge, mirrored across
/// both axes. Order is always front-left, front-right, rear-left, rear-right.
pub fn board_hole_locations(
    board: &BoardOutline,
    inset: f64,
) -> Result<[CornerHole; 4], PlacementError> {
    check_positive("board_width", board.width)?;
    check_positive("board_length", board.length)?;
    check_positive("hole_inset", inset)?;
    let limit = board.width.min(board.length) / 2.0;
    if inset >= limit {
        return Err(PlacementError::InvalidMeasurement {
            name: "hole_inset".to_string(),
            value: inset,
            reason: format!("must be less than half the shorter board side ({limit})"),
        });
    }
    let hx = board.width / 2.0 - inset;
    let hy = board.length / 2.0 - inset;
    Ok(Corner::ORDER.map(|corner| {
        let (sx, sy) = corner.signs();
        CornerHole {
            corner,
            center: Point2::new(sx * hx, sy * hy),
        }
    }))
}

/// `count` positions along one axis: `start`, `start + pitch`, ...
/// A negative pitch lays the row out in the other direction.
pub fn linear_connector_row(
    start: f64,
    pitch: f64,
    count: usize,
) -> Result<Vec<f64>, PlacementError> {
    check_finite("row_start", start)?;
    check_finite("row_pitch", pitch)?;
    Ok((0..count).map(|i| start + i as f64 * pitch).collect())
}

/// Same as [`linear_connector_row`] for a row running along `step` on a face.
pub fn connector_row_2d(
    start: Point2<f64>,
    step: Vector2<f64>,
    count: usize,
) -> Result<Vec<Point2<f64>>, PlacementError> {
    check_finite("row_start.x", start.x)?;
    check_finite("row_start.y", start.y)?;
    check_finite("row_step.x", step.x)?;
    check_finite("row_step.y", step.y)?;
    Ok((0..count).map(|i| start + step * i as f64).collect())
}

/// Convert a signed count (as read from configuration) into a row length.
pub fn connector_count(name: &str, count: i64) -> Result<usize, PlacementError> {
    usize::try_from(count).map_err(|_| PlacementError::InvalidCount {
        name: name.to_string(),
        count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn default_board_holes() {
        let board = BoardOutline::new(117.0, 101.0).unwrap();
        let holes = board_hole_locations(&board, 3.75).unwrap();
        assert_eq!(holes[0].corner, Corner::FrontLeft);
        assert_relative_eq!(holes[0].center, Point2::new(-54.75, -46.75));
        assert_relative_eq!(holes[1].center, Point2::new(54.75, -46.75));
        assert_relative_eq!(holes[2].center, Point2::new(-54.75, 46.75));
        assert_relative_eq!(holes[3].center, Point2::new(54.75, 46.75));
    }

    #[test]
    fn inset_beyond_half_side_rejected() {
        let board = BoardOutline::new(20.0, 10.0).unwrap();
        assert!(board_hole_locations(&board, 5.0).is_err());
        assert!(board_hole_locations(&board, 0.0).is_err());
        assert!(board_hole_locations(&board, 4.99).is_ok());
    }

    #[test]
    fn non_finite_outline_rejected_even_without_constructor() {
        let nan_wide = BoardOutline {
            width: f64::NAN,
            length: 101.0,
        };
        assert!(matches!(
            board_hole_locations(&nan_wide, 3.75),
            Err(PlacementError::InvalidMeasurement { ref name, .. }) if name == "board_width"
        ));
        let endless = BoardOutline {
            width: 117.0,
            length: f64::INFINITY,
        };
        assert!(matches!(
            board_hole_locations(&endless, 3.75),
            Err(PlacementError::InvalidMeasurement { ref name, .. }) if name == "board_length"
        ));
        assert!(BoardOutline::new(f64::NAN, 101.0).is_err());
    }

    #[test]
    fn row_of_three() {
        assert_eq!(linear_connector_row(0.0, 5.0, 3).unwrap(), vec![0.0, 5.0, 10.0]);
    }

    #[test]
    fn empty_row_and_negative_pitch() {
        assert!(linear_connector_row(4.0, 2.0, 0).unwrap().is_empty());
        assert_eq!(linear_connector_row(4.0, -2.0, 3).unwrap(), vec![4.0, 2.0, 0.0]);
    }

    #[test]
    fn non_finite_pitch_rejected() {
        assert!(linear_connector_row(0.0, f64::NAN, 2).is_err());
    }

    #[test]
    fn negative_configured_count_rejected() {
        assert_eq!(connector_count("rca_video_count", 3).unwrap(), 3);
        assert_eq!(
            connector_count("rca_video_count", -1),
            Err(PlacementError::InvalidCount {
                name: "rca_video_count".to_string(),
                count: -1
            })
        );
    }

    #[test]
    fn row_2d_walks_step() {
        let row = connector_row_2d(Point2::new(1.0, 2.0), Vector2::new(-13.8, 0.0), 3).unwrap();
        assert_relative_eq!(row[2], Point2::new(-26.6, 2.0), epsilon = 1e-12);
    }
}
