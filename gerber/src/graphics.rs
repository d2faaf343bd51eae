//! The Gerber graphics-state machine and the per-operation snapshot it produces.
//!
//! Grounded on the original `OperationState` NamedTuple and the mutable fields of
//! `GerberLayer.__init__` in `layers/gerber_layer.py`.

use std::rc::Rc;

use crate::aperture::Aperture;
use crate::geometry::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    Linear,
    CW,
    CCW,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuadrantMode {
    Single,
    Multi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    MM,
    Inch,
}

/// Dark (add material, `true`) vs clear (erase, `false`).
pub type Polarity = bool;

/// The geometric payload of an operation: a plain endpoint for draws/flashes, or
/// `(endpoint, center_offset)` for arc interpolation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OperationPoint {
    Point(Point),
    Arc(Point, Point),
}

impl OperationPoint {
    /// The endpoint the current point advances to, regardless of variant.
    pub fn endpoint(&self) -> Point {
        match self {
            OperationPoint::Point(p) => *p,
            OperationPoint::Arc(p, _) => *p,
        }
    }
}

/// The full graphics-state snapshot attached to every operation. Consumers
/// (renderers) need no back-reference to the parser's live state.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationState {
    /// `None` only for operations inside a region.
    pub aperture: Option<Rc<Aperture>>,
    pub interpolation: InterpolationMode,
    pub point: OperationPoint,
    pub previous_point: Point,
    pub polarity: Polarity,
    pub quadrant_mode: QuadrantMode,
    pub scalars: (f64, f64),
    pub units: Units,
}

/// Which kind of operation a `(op_kind, OperationState)` pair represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Flash,
    Move,
    Interp,
}

/// The live, mutable graphics state the parser threads through a document scan.
/// Not part of the public operation stream; each operation instead receives an
/// owned [`OperationState`] snapshot of the relevant fields.
#[derive(Debug, Clone)]
pub struct GraphicsState {
    pub current_aperture: Option<i32>,
    pub interpolation: InterpolationMode,
    pub quadrant_mode: QuadrantMode,
    pub polarity: Polarity,
    pub units: Units,
    pub scalars: (f64, f64),
    pub current_point: Option<Point>,
    pub region: bool,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            current_aperture: None,
            interpolation: InterpolationMode::Linear,
            quadrant_mode: QuadrantMode::Multi,
            polarity: true,
            units: Units::MM,
            scalars: (1.0, 1.0),
            current_point: None,
            region: false,
        }
    }
}
