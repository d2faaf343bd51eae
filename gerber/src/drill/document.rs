//! The parsed Excellon (NC-Drill) document (§3, §4.5).
//!
//! Grounded on the accumulated fields of `NCDrill`/`DrillLayer` in the original
//! `standard/nc_drill.py`.

use crate::drill::classifier::SegmentKind;
use crate::geometry::Point;
use crate::graphics::Units;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrillOperation {
    DrillHit { tool_index: u32, point: Point },
    RoutSegment { tool_index: u32, segment_kind: SegmentKind, point: Point },
    ToolDown,
    ToolUp,
}

#[derive(Debug, Clone, Default)]
pub struct DrillDocument {
    pub units: Option<Units>,
    /// Tool index to bit diameter, in declaration order.
    pub tool_table: Vec<(u32, f64)>,
    pub operations: Vec<DrillOperation>,
    pub comments: Vec<String>,
}

impl DrillDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn diameter_of(&self, index: u32) -> Option<f64> {
        self.tool_table.iter().find(|(i, _)| *i == index).map(|(_, d)| *d)
    }

    /// The tool index already registered for `diameter`, if any (used by the
    /// builder to deduplicate repeated `add_hole` calls with the same bit).
    pub fn index_of_diameter(&self, diameter: f64) -> Option<u32> {
        self.tool_table
            .iter()
            .find(|(_, d)| *d == diameter)
            .map(|(i, _)| *i)
    }
}
