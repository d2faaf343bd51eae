//! The aperture subsystem: built-in shape templates, user-defined macros, and the
//! factory that instantiates concrete [`Aperture`]s from `AD`/`AM` commands.
//!
//! Grounded on the original `layers/aperture.py` (`ApertureCircle`/`ApertureRectangle`/
//! `ApertureObround`/`AperturePolygon`/`ApertureOutline` NamedTuples, `MacroPrimitive`,
//! `Macro.generate_aperture`, `ApertureFactory`).

use std::collections::HashMap;

use crate::error::GerberError;
use crate::macro_expr;

/// A 2-D shape stamp. Flashing it at a point paints that shape there.
#[derive(Debug, Clone, PartialEq)]
pub enum ApertureShape {
    Circle {
        diameter: f64,
        cx: f64,
        cy: f64,
    },
    Rectangle {
        width: f64,
        height: f64,
        cx: f64,
        cy: f64,
        rotation: f64,
    },
    Obround {
        width: f64,
        height: f64,
        cx: f64,
        cy: f64,
    },
    Polygon {
        diameter: f64,
        vertices: u32,
        rotation: f64,
        cx: f64,
        cy: f64,
    },
    Outline {
        points: Vec<(f64, f64)>,
        rotation: f64,
    },
}

/// A concrete, instantiated aperture, referenced by subsequent operations via `index`.
#[derive(Debug, Clone, PartialEq)]
pub struct Aperture {
    pub index: i32,
    pub shape: ApertureShape,
    pub exposure: bool,
    pub rotation: f64,
    pub hole_diameter: f64,
    pub comments: Vec<String>,
    /// Name of the macro this aperture was instantiated from, if any. `None` for
    /// the four built-in shapes (`C`/`R`/`O`/`P`). Kept so the emitter can
    /// reconstruct the original `AD` line rather than guessing a built-in token
    /// for a macro-only shape such as `Outline`.
    pub macro_name: Option<String>,
    /// The raw `AD` parameter list (post-`X`-split, pre-macro-evaluation), kept
    /// for faithful re-emission.
    pub definition_params: Vec<f64>,
}

/// One of the seven aperture-macro primitives (§3). Primitives 6 and 7 (Moire,
/// Thermal) are accepted by the macro definer but fail to instantiate (§4.3, Non-goals).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroPrimitiveKind {
    Comment,
    Circle,
    VectorLine,
    CenterLine,
    Outline,
    Polygon,
    Moire,
    Thermal,
}

impl MacroPrimitiveKind {
    pub fn from_code(code: i32) -> Option<Self> {
        Some(match code {
            0 => Self::Comment,
            1 => Self::Circle,
            20 => Self::VectorLine,
            21 => Self::CenterLine,
            4 => Self::Outline,
            5 => Self::Polygon,
            6 => Self::Moire,
            7 => Self::Thermal,
            _ => return None,
        })
    }

    pub fn to_code(self) -> i32 {
        match self {
            Self::Comment => 0,
            Self::Circle => 1,
            Self::VectorLine => 20,
            Self::CenterLine => 21,
            Self::Outline => 4,
            Self::Polygon => 5,
            Self::Moire => 6,
            Self::Thermal => 7,
        }
    }
}

/// One statement within a macro body: `(primitive, raw comma-separated expression text)`.
#[derive(Debug, Clone, PartialEq)]
pub struct MacroStatement {
    pub primitive: MacroPrimitiveKind,
    pub expression: String,
}

/// A user-defined aperture macro: an ordered sequence of statements plus a name.
#[derive(Debug, Clone, PartialEq)]
pub struct Macro {
    pub name: String,
    pub statements: Vec<MacroStatement>,
}

impl Macro {
    /// The number of distinct `$N` placeholders referenced across every statement.
    pub fn arity(&self) -> usize {
        macro_expr::distinct_placeholders(
            self.statements
                .iter()
                .filter(|s| s.primitive != MacroPrimitiveKind::Comment)
                .map(|s| s.expression.as_str()),
        )
        .len()
    }

    /// Instantiate a concrete [`Aperture`] by evaluating every statement in order
    /// against `values`. The last non-comment statement determines exposure and
    /// rotation; each statement overwrites the running shape.
    pub fn generate_aperture(&self, index: i32, values: &[f64]) -> Result<Aperture, GerberError> {
        let expected = self.arity();
        if expected != values.len() {
            return Err(GerberError::ArityMismatch {
                macro_name: self.name.clone(),
                expected,
                got: values.len(),
            });
        }

        let mut shape = None;
        let mut exposure = true;
        let mut rotation = 0.0;

        for statement in &self.statements {
            if statement.primitive == MacroPrimitiveKind::Comment {
                continue;
            }
            let row = macro_expr::evaluate_fields(&statement.expression, values).map_err(|reason| {
                GerberError::MalformedMacro { reason }
            })?;
            match statement.primitive {
                MacroPrimitiveKind::Comment => unreachable!(),
                MacroPrimitiveKind::Circle => {
                    let [e, diameter, cx, cy, rot] = take5(&row, "circle")?;
                    exposure = e != 0.0;
                    rotation = rot;
                    shape = Some(ApertureShape::Circle { diameter, cx, cy });
                }
                MacroPrimitiveKind::VectorLine => {
                    let [e, thickness, x1, y1, x2, y2, rot] = take7(&row, "vector line")?;
                    exposure = e != 0.0;
                    rotation = rot;
                    let width = (x2 - x1).hypot(y2 - y1);
                    let angle = (y2 - y1).atan2(x2 - x1);
                    shape = Some(ApertureShape::Rectangle {
                        width,
                        height: thickness,
                        cx: x1 + (x2 - x1) / 2.0,
                        cy: y1 + (y2 - y1) / 2.0,
                        rotation: angle,
                    });
                }
                MacroPrimitiveKind::CenterLine => {
                    let [e, w, h, cx, cy, rot] = take6(&row, "center line")?;
                    exposure = e != 0.0;
                    rotation = rot;
                    shape = Some(ApertureShape::Rectangle {
                        width: w,
                        height: h,
                        cx,
                        cy,
                        rotation: 0.0,
                    });
                }
                MacroPrimitiveKind::Outline => {
                    if row.len() < 4 {
                        return Err(GerberError::MalformedMacro {
                            reason: "outline requires at least exposure, count, one point, and rotation"
                                .to_string(),
                        });
                    }
                    exposure = row[0] != 0.0;
                    let n = row[1] as i64;
                    if n < 0 {
                        return Err(GerberError::MalformedMacro {
                            reason: "outline vertex count must be >= 0".to_string(),
                        });
                    }
                    let vertices = n as usize + 1;
                    rotation = *row.last().unwrap();
                    let point_values = &row[2..row.len() - 1];
                    if point_values.len() != 2 * vertices {
                        return Err(GerberError::MalformedMacro {
                            reason: format!(
                                "outline expected {} point values, got {}",
                                2 * vertices,
                                point_values.len()
                            ),
                        });
                    }
                    let points = point_values
                        .chunks_exact(2)
                        .map(|pair| (pair[0], pair[1]))
                        .collect();
                    shape = Some(ApertureShape::Outline { points, rotation });
                }
                MacroPrimitiveKind::Polygon => {
                    let [e, vertices, cx, cy, diameter, rot] = take6(&row, "polygon")?;
                    exposure = e != 0.0;
                    rotation = rot;
                    shape = Some(ApertureShape::Polygon {
                        diameter,
                        vertices: vertices as u32,
                        rotation: rot,
                        cx,
                        cy,
                    });
                }
                MacroPrimitiveKind::Moire => {
                    return Err(GerberError::Unimplemented { primitive: "moire" })
                }
                MacroPrimitiveKind::Thermal => {
                    return Err(GerberError::Unimplemented {
                        primitive: "thermal",
                    })
                }
            }
        }

        Ok(Aperture {
            index,
            shape: shape.ok_or_else(|| GerberError::MalformedMacro {
                reason: format!("macro {:?} produced no shape", self.name),
            })?,
            exposure,
            rotation,
            hole_diameter: 0.0,
            comments: Vec::new(),
            macro_name: None,
            definition_params: Vec::new(),
        })
    }
}

fn take5(row: &[f64], what: &str) -> Result<[f64; 5], GerberError> {
    row.try_into().map_err(|_| GerberError::MalformedMacro {
        reason: format!("{what} primitive expects 5 values, got {}", row.len()),
    })
}

fn take6(row: &[f64], what: &str) -> Result<[f64; 6], GerberError> {
    row.try_into().map_err(|_| GerberError::MalformedMacro {
        reason: format!("{what} primitive expects 6 values, got {}", row.len()),
    })
}

fn take7(row: &[f64], what: &str) -> Result<[f64; 7], GerberError> {
    row.try_into().map_err(|_| GerberError::MalformedMacro {
        reason: format!("{what} primitive expects 7 values, got {}", row.len()),
    })
}

/// Instantiates concrete apertures from `AD` commands and stores `AM` macro
/// definitions. Grounded on the original `ApertureFactory`.
#[derive(Debug, Default)]
pub struct ApertureFactory {
    pub macros: HashMap<String, Macro>,
}

impl ApertureFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `AM<name>*\n<stmt>*\n…` and store the resulting [`Macro`].
    pub fn define_macro(&mut self, payload: &str) -> Result<(), GerberError> {
        let mut lines = payload.split("*\n");
        let name = lines
            .next()
            .ok_or_else(|| GerberError::MalformedMacro {
                reason: "empty macro definition".to_string(),
            })?
            .trim()
            .to_string();

        let mut statements = Vec::new();
        for raw in lines {
            let row = raw.trim_end_matches('*').replace('\n', "");
            if row.is_empty() {
                continue;
            }
            let digit_count = row.chars().take_while(|c| c.is_ascii_digit()).count();
            if digit_count == 0 {
                return Err(GerberError::MalformedMacro {
                    reason: format!("macro statement does not start with a primitive code: {row:?}"),
                });
            }
            let (code_text, rest) = row.split_at(digit_count);
            let code: i32 = code_text.parse().map_err(|_| GerberError::MalformedMacro {
                reason: format!("macro primitive code {code_text:?} is not a valid integer"),
            })?;
            let primitive = MacroPrimitiveKind::from_code(code).ok_or_else(|| GerberError::MalformedMacro {
                reason: format!("unknown macro primitive code {code}"),
            })?;
            let expression = rest.strip_prefix(',').ok_or_else(|| GerberError::MalformedMacro {
                reason: format!("missing comma after primitive code in {row:?}"),
            })?.to_string();
            if primitive == MacroPrimitiveKind::Comment {
                log::info!("macro {name:?} comment: {expression}");
                continue;
            }
            statements.push(MacroStatement {
                primitive,
                expression,
            });
        }

        self.macros.insert(name.clone(), Macro { name, statements });
        Ok(())
    }

    /// Parse `D<id><shape-or-macro-name>,<n1>X<n2>X…` and instantiate the aperture.
    pub fn from_aperture_define(
        &self,
        payload: &str,
        comments: Vec<String>,
    ) -> Result<Aperture, GerberError> {
        let digit_count = payload.chars().take_while(|c| c.is_ascii_digit()).count();
        if digit_count == 0 {
            return Err(GerberError::UnknownApertureShape {
                shape: payload.to_string(),
            });
        }
        let (id_text, body) = payload.split_at(digit_count);
        let index: i32 = id_text.parse().map_err(|_| GerberError::UnknownApertureShape {
            shape: payload.to_string(),
        })?;

        let (shape_token, params_text) = body.split_once(',').ok_or_else(|| GerberError::UnknownApertureShape {
            shape: payload.to_string(),
        })?;

        let parameters: Vec<f64> = params_text
            .split('X')
            .map(|p| p.parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| GerberError::UnknownApertureShape {
                shape: payload.to_string(),
            })?;

        let mut aperture = if let Some(macro_def) = self.macros.get(shape_token) {
            let mut aperture = macro_def.generate_aperture(index, &parameters)?;
            aperture.macro_name = Some(shape_token.to_string());
            aperture.definition_params = parameters.clone();
            aperture
        } else {
            let (shape, _hole) = match shape_token {
                "C" => {
                    let [diameter, hole] = pad::<2>(&parameters);
                    (ApertureShape::Circle { diameter, cx: 0.0, cy: 0.0 }, hole)
                }
                "R" => {
                    let [width, height, hole] = pad::<3>(&parameters);
                    (
                        ApertureShape::Rectangle {
                            width,
                            height,
                            cx: 0.0,
                            cy: 0.0,
                            rotation: 0.0,
                        },
                        hole,
                    )
                }
                "O" => {
                    let [width, height, hole] = pad::<3>(&parameters);
                    (
                        ApertureShape::Obround {
                            width,
                            height,
                            cx: 0.0,
                            cy: 0.0,
                        },
                        hole,
                    )
                }
                "P" => {
                    let [diameter, vertices, rotation, hole] = pad::<4>(&parameters);
                    (
                        ApertureShape::Polygon {
                            diameter,
                            vertices: vertices as u32,
                            rotation,
                            cx: 0.0,
                            cy: 0.0,
                        },
                        hole,
                    )
                }
                other => {
                    return Err(GerberError::UnknownApertureShape {
                        shape: other.to_string(),
                    })
                }
            };
            Aperture {
                index,
                shape,
                exposure: true,
                rotation: 0.0,
                hole_diameter: _hole,
                comments: Vec::new(),
                macro_name: None,
                definition_params: parameters.clone(),
            }
        };

        aperture.comments = comments;
        Ok(aperture)
    }
}

/// Pad a parameter slice out to `N` entries with trailing zeros.
fn pad<const N: usize>(params: &[f64]) -> [f64; N] {
    let mut out = [0.0; N];
    for (slot, value) in out.iter_mut().zip(params.iter()) {
        *slot = *value;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circle_define() {
        let factory = ApertureFactory::new();
        let aperture = factory.from_aperture_define("10C,0.5", Vec::new()).unwrap();
        assert_eq!(aperture.index, 10);
        assert_eq!(
            aperture.shape,
            ApertureShape::Circle {
                diameter: 0.5,
                cx: 0.0,
                cy: 0.0
            }
        );
    }

    #[test]
    fn test_rectangle_define() {
        let factory = ApertureFactory::new();
        let aperture = factory.from_aperture_define("12R,0.6X0.6", Vec::new()).unwrap();
        assert_eq!(
            aperture.shape,
            ApertureShape::Rectangle {
                width: 0.6,
                height: 0.6,
                cx: 0.0,
                cy: 0.0,
                rotation: 0.0
            }
        );
    }

    #[test]
    fn test_unknown_shape() {
        let factory = ApertureFactory::new();
        assert!(factory.from_aperture_define("13Z,1", Vec::new()).is_err());
    }

    #[test]
    fn test_macro_centerline() {
        let mut factory = ApertureFactory::new();
        factory.define_macro("ROUNDRECT*\n21,1,$1,$2,0,0,0").unwrap();
        let aperture = factory
            .from_aperture_define("11ROUNDRECT,2X1", Vec::new())
            .unwrap();
        assert_eq!(
            aperture.shape,
            ApertureShape::Rectangle {
                width: 2.0,
                height: 1.0,
                cx: 0.0,
                cy: 0.0,
                rotation: 0.0
            }
        );
    }

    #[test]
    fn test_macro_arity_mismatch() {
        let mut factory = ApertureFactory::new();
        factory.define_macro("ROUNDRECT*\n21,1,$1,$2,0,0,0").unwrap();
        let macro_def = &factory.macros["ROUNDRECT"];
        assert!(macro_def.generate_aperture(11, &[1.0]).is_err());
        assert!(macro_def.generate_aperture(11, &[1.0, 2.0]).is_ok());
    }

    #[test]
    fn test_macro_vector_line_geometry() {
        let mut factory = ApertureFactory::new();
        factory
            .define_macro("LINE*\n20,1,0.1,0,0,3,4,0")
            .unwrap();
        let aperture = factory.macros["LINE"].generate_aperture(20, &[]).unwrap();
        match aperture.shape {
            ApertureShape::Rectangle {
                width,
                height,
                cx,
                cy,
                rotation,
            } => {
                assert!((width - 5.0).abs() < 1e-9);
                assert_eq!(height, 0.1);
                assert_eq!((cx, cy), (1.5, 2.0));
                assert!((rotation - (4f64).atan2(3f64)).abs() < 1e-9);
            }
            other => panic!("expected rectangle, got {other:?}"),
        }
    }

    #[test]
    fn test_macro_moire_unimplemented() {
        let mut factory = ApertureFactory::new();
        factory
            .define_macro("RING*\n6,0,0,0.5,0.1,0.05,3,0.01,0.5,0")
            .unwrap();
        let err = factory.macros["RING"].generate_aperture(30, &[]).unwrap_err();
        assert!(matches!(err, GerberError::Unimplemented { primitive: "moire" }));
    }
}
