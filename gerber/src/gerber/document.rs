//! The parsed Gerber document: the public, immutable result of a parse (§3).
//!
//! Grounded on `GerberLayer`'s accumulated fields in `layers/gerber_layer.py`
//! (`self.apertures`, `self.macros`, `self.operations`, `self.regions`, plus the
//! header comments and file attributes collected along the way).

use std::collections::HashMap;
use std::rc::Rc;

use crate::aperture::{Aperture, Macro};
use crate::geometry::CoordinateFormat;
use crate::graphics::{OperationKind, OperationState, Polarity, QuadrantMode, Units};
use crate::layer::LayerKind;

/// One drawing command: its kind, tagged with the graphics-state snapshot that
/// was in effect when it occurred.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    pub kind: OperationKind,
    pub state: OperationState,
}

/// A closed outline built from a `G36`/`G37` region block. Operations inside a
/// region carry no aperture; the region itself is filled per its polarity.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub operations: Vec<Operation>,
    pub polarity: bool,
}

/// A `%TF...%` file attribute: the attribute name and its ordered field values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileAttribute {
    pub name: String,
    pub fields: Vec<String>,
}

/// The full parsed result of a Gerber source file.
#[derive(Debug, Clone, Default)]
pub struct GerberDocument {
    pub header_comments: Vec<String>,
    pub format: Option<CoordinateFormat>,
    pub units: Option<Units>,
    pub quadrant_mode: Option<QuadrantMode>,
    pub polarity: Option<Polarity>,
    /// Kept in first-insertion order, not sorted by D-code, to match the
    /// original's insertion-ordered dict and reproduce its `AD` emission order.
    pub apertures: Vec<(i32, Rc<Aperture>)>,
    pub macros: HashMap<String, Macro>,
    pub operations: Vec<Operation>,
    pub regions: Vec<Region>,
    pub file_attributes: Vec<FileAttribute>,
    pub layer_kind: Option<LayerKind>,
}

impl GerberDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn aperture(&self, index: i32) -> Option<&Rc<Aperture>> {
        self.apertures.iter().find(|(i, _)| *i == index).map(|(_, a)| a)
    }

    /// Insert an aperture, replacing any existing entry at the same index in
    /// place (preserving its original position) rather than appending a duplicate.
    pub fn insert_aperture(&mut self, aperture: Rc<Aperture>) {
        match self.apertures.iter_mut().find(|(i, _)| *i == aperture.index) {
            Some(slot) => slot.1 = aperture,
            None => self.apertures.push((aperture.index, aperture)),
        }
    }
}
