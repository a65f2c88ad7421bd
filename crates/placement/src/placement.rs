use enclosure_types::{PlacedShape, Shape2D};
use nalgebra::{Point2, Point3};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::PlacementError;
use crate::frame::ReferenceFrame;
use crate::measure::check_finite;

/// Where a single cutout or protrusion goes.
///
/// Computed on demand from a resolved frame and consumed straight away by a
/// sketch; nothing keeps placements around after the solid is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeaturePlacement {
    /// What the feature is, e.g. `rca_video_1`.
    pub label: String,
    /// The frame the feature was laid out in.
    pub frame: ReferenceFrame,
    /// Position in the frame's sketch plane.
    pub local: Point2<f64>,
    /// Optional outline drawn at the position.
    pub shape: Option<Shape2D>,
    /// Position in root coordinates.
    pub world: Point3<f64>,
}

impl FeaturePlacement {
    pub fn on(
        frame: &ReferenceFrame,
        label: impl Into<String>,
        local: Point2<f64>,
        shape: Option<Shape2D>,
    ) -> Result<Self, PlacementError> {
        let label = label.into();
        check_finite(&label, local.x)?;
        check_finite(&label, local.y)?;
        let world = frame.to_world_2d(&local);
        debug!(label = %label, frame = %frame.name, ?local, ?world, "placed feature");
        Ok(Self {
            label,
            frame: frame.clone(),
            local,
            shape,
            world,
        })
    }

    /// Position of this feature in `target`'s coordinates.
    pub fn reexpress(&self, target: &ReferenceFrame) -> Point3<f64> {
        target.to_local(&self.world)
    }

    /// The sketch primitive at this placement, if the placement has a shape.
    pub fn placed_shape(&self) -> Option<PlacedShape> {
        self.shape
            .map(|shape| PlacedShape::new(shape, [self.local.x, self.local.y]))
    }
}
