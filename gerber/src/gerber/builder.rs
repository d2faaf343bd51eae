//! Programmatic `GerberDocument` construction without parsing text (§6).
//!
//! Grounded on `api/gerber_builder.py`'s `GerberBuilder`/config object, kept as
//! a typed struct (rather than the source's `getattr`-based dynamic config) per
//! the "Configuration" ambient-stack note.

use std::rc::Rc;

use crate::aperture::{Aperture, ApertureShape};
use crate::error::GerberError;
use crate::geometry::{CoordinateFormat, Point};
use crate::gerber::document::{GerberDocument, Operation};
use crate::graphics::{GraphicsState, InterpolationMode, OperationKind, OperationPoint, OperationState, Polarity, QuadrantMode, Units};

/// The enumerated set of options the builder understands. Anything else fails
/// `UnknownConfigOption` rather than being silently ignored.
#[derive(Debug, Clone, Default)]
pub struct GerberBuilderConfig {
    pub integer_digits: Option<(u32, u32)>,
    pub decimal_digits: Option<(u32, u32)>,
    pub scalars: Option<(f64, f64)>,
    pub quadrant_mode: Option<QuadrantMode>,
    pub units: Option<Units>,
    pub interpolation: Option<InterpolationMode>,
    pub polarity: Option<Polarity>,
}

impl GerberBuilderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one `name = value`-style dynamic option, as the source's
    /// `getattr`-driven config loop would. `value` is parsed per option.
    pub fn set(&mut self, option: &str, value: &str) -> Result<(), GerberError> {
        match option {
            "units" => {
                self.units = Some(match value {
                    "MM" => Units::MM,
                    "IN" => Units::Inch,
                    _ => return Err(GerberError::UnknownConfigOption { option: option.to_string() }),
                })
            }
            "quadrant_mode" => {
                self.quadrant_mode = Some(match value {
                    "Single" => QuadrantMode::Single,
                    "Multi" => QuadrantMode::Multi,
                    _ => return Err(GerberError::UnknownConfigOption { option: option.to_string() }),
                })
            }
            "interpolation" => {
                self.interpolation = Some(match value {
                    "Linear" => InterpolationMode::Linear,
                    "CW" => InterpolationMode::CW,
                    "CCW" => InterpolationMode::CCW,
                    _ => return Err(GerberError::UnknownConfigOption { option: option.to_string() }),
                })
            }
            "polarity" => {
                self.polarity = Some(match value {
                    "D" => true,
                    "C" => false,
                    _ => return Err(GerberError::UnknownConfigOption { option: option.to_string() }),
                })
            }
            "integer_digits" | "decimal_digits" | "scalars" => {
                // Structured (tuple-valued) options are set via the typed fields
                // directly; a string-keyed call for them is a caller error.
                return Err(GerberError::UnknownConfigOption { option: option.to_string() });
            }
            other => return Err(GerberError::UnknownConfigOption { option: other.to_string() }),
        }
        Ok(())
    }
}

/// Incrementally assembles a [`GerberDocument`] by flashing apertures at
/// positions, without going through the text parser.
pub struct GerberBuilder {
    document: GerberDocument,
    state: GraphicsState,
    registered: Vec<(ApertureShape, Rc<Aperture>)>,
    next_index: i32,
}

impl GerberBuilder {
    pub fn new() -> Self {
        Self::with_config(GerberBuilderConfig::new())
    }

    pub fn with_config(config: GerberBuilderConfig) -> Self {
        let format = CoordinateFormat::new(
            config.integer_digits.unwrap_or((4, 4)),
            config.decimal_digits.unwrap_or((6, 6)),
        );
        let mut state = GraphicsState::default();
        state.scalars = config.scalars.unwrap_or_else(|| format.scalars());
        state.quadrant_mode = config.quadrant_mode.unwrap_or(QuadrantMode::Multi);
        state.units = config.units.unwrap_or(Units::MM);
        state.interpolation = config.interpolation.unwrap_or(InterpolationMode::Linear);
        state.polarity = config.polarity.unwrap_or(true);

        let mut document = GerberDocument::new();
        document.format = Some(format);
        document.units = Some(state.units);
        document.quadrant_mode = Some(state.quadrant_mode);
        document.polarity = Some(state.polarity);

        Self {
            document,
            state,
            registered: Vec::new(),
            next_index: 10,
        }
    }

    /// Flash `shape` at `position`, reusing a previously registered aperture
    /// with an identical definition rather than allocating a new D-code.
    ///
    /// Fails with `UnknownApertureShape` for an `Outline` shape, since that
    /// variant has no built-in `AD` token and can only be emitted as a macro
    /// instantiation; build it via a macro instead (§9, aperture provenance).
    pub fn flash(&mut self, shape: ApertureShape) -> Result<&mut Self, GerberError> {
        self.flash_at(shape, Point::default())
    }

    pub fn flash_at(&mut self, shape: ApertureShape, position: Point) -> Result<&mut Self, GerberError> {
        if matches!(shape, ApertureShape::Outline { .. }) {
            return Err(GerberError::UnknownApertureShape {
                line: 0,
                shape: "Outline (no built-in AD token; define it via a macro)".to_string(),
            });
        }

        let aperture = match self.registered.iter().find(|(s, _)| *s == shape) {
            Some((_, existing)) => existing.clone(),
            None => {
                let aperture = Rc::new(Aperture {
                    index: self.next_index,
                    shape: shape.clone(),
                    exposure: true,
                    rotation: 0.0,
                    hole_diameter: 0.0,
                    comments: Vec::new(),
                    macro_name: None,
                    definition_params: Vec::new(),
                });
                self.next_index += 1;
                self.document.insert_aperture(aperture.clone());
                self.registered.push((shape, aperture.clone()));
                aperture
            }
        };

        let previous_point = self.state.current_point.unwrap_or_default();
        self.document.operations.push(Operation {
            kind: OperationKind::Flash,
            state: OperationState {
                aperture: Some(aperture),
                interpolation: self.state.interpolation,
                point: OperationPoint::Point(position),
                previous_point,
                polarity: self.state.polarity,
                quadrant_mode: self.state.quadrant_mode,
                scalars: self.state.scalars,
                units: self.state.units,
            },
        });
        self.state.current_point = Some(position);
        Ok(self)
    }

    pub fn build(self) -> GerberDocument {
        self.document
    }
}

impl Default for GerberBuilder {
    fn default() -> Self {
        Self::new()
    }
}
