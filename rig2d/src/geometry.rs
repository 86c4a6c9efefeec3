#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Widget rectangle in window-manager (global) coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WidgetGeometry {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl WidgetGeometry {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

/// Skeleton root position and scale derived from widget geometry.
///
/// Recomputed on every move/resize; purely a function of its inputs, so
/// computing it twice with the same inputs yields the same placement.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct WorldPlacement {
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

impl WorldPlacement {
    /// Anchors the skeleton root at the widget's bottom-center and scales it
    /// by `(factor * widget size) / viewport size`.
    pub fn compute(
        geometry: &WidgetGeometry,
        viewport: Size,
        scale_x: f32,
        scale_y: f32,
    ) -> Self {
        let vw = viewport.width.max(1.0);
        let vh = viewport.height.max(1.0);
        Self {
            x: geometry.x + geometry.width / 2.0,
            y: geometry.y + geometry.height,
            scale_x: scale_x * geometry.width / vw,
            scale_y: scale_y * geometry.height / vh,
        }
    }
}
