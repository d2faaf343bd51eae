//! Programmatic [`DrillDocument`] construction without parsing text (§6).
//!
//! Grounded on `api/drilling.py`'s `Drilling` builder in the original source.

use crate::drill::document::{DrillDocument, DrillOperation};
use crate::geometry::Point;
use crate::graphics::Units;

/// Incrementally assembles a [`DrillDocument`] by adding holes, assigning each
/// distinct bit diameter its own tool index on first use.
pub struct Drilling {
    document: DrillDocument,
    next_index: u32,
}

impl Drilling {
    pub fn new(units: Units) -> Self {
        let mut document = DrillDocument::new();
        document.units = Some(units);
        Self {
            document,
            next_index: 1,
        }
    }

    /// Add a drill hit at `(x, y)` with the given bit `diameter`, reusing an
    /// already-declared tool for that diameter rather than declaring a new one.
    pub fn add_hole(&mut self, x: f64, y: f64, diameter: f64) -> &mut Self {
        let tool_index = match self.document.index_of_diameter(diameter) {
            Some(index) => index,
            None => {
                let index = self.next_index;
                self.next_index += 1;
                self.document.tool_table.push((index, diameter));
                index
            }
        };
        self.document.operations.push(DrillOperation::DrillHit {
            tool_index,
            point: Point::new(x, y),
        });
        self
    }

    pub fn build(self) -> DrillDocument {
        self.document
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drill::emitter;
    use crate::drill::parser;

    #[test]
    fn test_add_hole_reuses_tool_for_same_diameter() {
        let mut drilling = Drilling::new(Units::MM);
        drilling.add_hole(1.0, 2.0, 0.3);
        drilling.add_hole(3.0, 4.0, 0.3);
        drilling.add_hole(5.0, 6.0, 0.6);
        let doc = drilling.build();
        assert_eq!(doc.tool_table, vec![(1, 0.3), (2, 0.6)]);
        assert_eq!(
            doc.operations,
            vec![
                DrillOperation::DrillHit { tool_index: 1, point: Point::new(1.0, 2.0) },
                DrillOperation::DrillHit { tool_index: 1, point: Point::new(3.0, 4.0) },
                DrillOperation::DrillHit { tool_index: 2, point: Point::new(5.0, 6.0) },
            ]
        );
    }

    #[test]
    fn test_builder_round_trip() {
        let mut drilling = Drilling::new(Units::MM);
        drilling.add_hole(100.0, 200.0, 0.3);
        let doc = drilling.build();
        let text = emitter::emit(&doc);
        let reparsed = parser::parse(&text, true).unwrap();
        assert_eq!(reparsed.operations, doc.operations);
        assert_eq!(reparsed.tool_table, doc.tool_table);
    }
}
