//! The Gerber line framer and modal graphics-state machine (§4.2).
//!
//! Grounded on `GerberLayer.read`/`GerberLayer._process_command` in the original
//! `layers/gerber_layer.py`: the same line-buffering-by-balanced-`%` strategy, the
//! same per-kind dispatch, generalised to emit an owned `OperationState` snapshot
//! per operation instead of mutating shared renderer state in place.

use std::mem;
use std::rc::Rc;

use nom::character::complete::char;
use nom::IResult;

use crate::aperture::ApertureFactory;
use crate::error::{GerberError, GerberResult};
use crate::geometry::{CoordinateFormat, Point};
use crate::gerber::classifier::{classify, GerberCommandKind};
use crate::gerber::document::{FileAttribute, GerberDocument, Operation, Region};
use crate::graphics::{GraphicsState, InterpolationMode, OperationPoint, OperationState, Units};
use crate::primitive;

/// Parse a complete Gerber source file.
///
/// In `strict` mode an unrecognised command aborts the parse with
/// `GerberError::UnknownCommand`; otherwise it is logged and skipped.
pub fn parse(input: &str, strict: bool) -> GerberResult<GerberDocument> {
    let mut doc = GerberDocument::new();
    let mut state = GraphicsState::default();
    let mut factory = ApertureFactory::new();
    let mut pending_comments: Vec<String> = Vec::new();
    let mut region_buffer: Vec<Operation> = Vec::new();

    let mut buffer = String::new();
    let mut odd_parity = false;
    let mut line_no = 0usize;
    let mut finished = false;

    for raw_line in input.lines() {
        line_no += 1;
        if raw_line.trim().is_empty() && buffer.is_empty() {
            continue;
        }
        buffer.push_str(raw_line);
        buffer.push('\n');
        if raw_line.matches('%').count() % 2 == 1 {
            odd_parity = !odd_parity;
        }

        let trimmed_end = buffer.trim_end();
        let ready = !odd_parity && (trimmed_end.ends_with('*') || trimmed_end.ends_with('%'));
        if !ready {
            continue;
        }

        let block = buffer.trim().to_string();
        buffer.clear();

        if process_block(
            &block,
            line_no,
            strict,
            &mut state,
            &mut doc,
            &mut factory,
            &mut pending_comments,
            &mut region_buffer,
        )? {
            finished = true;
            break;
        }
    }

    if !finished {
        log::warn!("Gerber input ended without an M02 terminator");
    }

    doc.macros = factory.macros;
    Ok(doc)
}

/// Process one fully-buffered block (either a bare `...*` command or a `%...%`
/// extended command, which may itself carry several statements for `AM`).
/// Returns `Ok(true)` once `M02` has been consumed.
fn process_block(
    block: &str,
    line_no: usize,
    strict: bool,
    state: &mut GraphicsState,
    doc: &mut GerberDocument,
    factory: &mut ApertureFactory,
    pending_comments: &mut Vec<String>,
    region_buffer: &mut Vec<Operation>,
) -> GerberResult<bool> {
    if let Some(inner) = block
        .strip_prefix('%')
        .and_then(|s| s.strip_suffix('%'))
    {
        let inner = inner.trim();
        return dispatch_line(
            inner, line_no, strict, state, doc, factory, pending_comments, region_buffer,
        );
    }

    for command in block.split('*') {
        let command = command.trim();
        if command.is_empty() {
            continue;
        }
        if dispatch_line(
            command, line_no, strict, state, doc, factory, pending_comments, region_buffer,
        )? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Classify one command string and dispatch it, re-submitting any residual
/// payload left over from a modal `G0x` prefix (§4.2, "modal multi-command lines").
fn dispatch_line(
    text: &str,
    line_no: usize,
    strict: bool,
    state: &mut GraphicsState,
    doc: &mut GerberDocument,
    factory: &mut ApertureFactory,
    pending_comments: &mut Vec<String>,
    region_buffer: &mut Vec<Operation>,
) -> GerberResult<bool> {
    let (kind, payload) = match classify(text, line_no) {
        Ok(pair) => pair,
        Err(err) => {
            if strict {
                return Err(err);
            }
            log::warn!("{err}");
            return Ok(false);
        }
    };
    let payload = normalize(payload);

    match kind {
        GerberCommandKind::Comment => {
            doc.header_comments.push(payload.to_string());
            pending_comments.push(payload.to_string());
        }
        GerberCommandKind::Units => {
            state.units = parse_units(payload, line_no)?;
            doc.units = Some(state.units);
            log::info!("units set to {:?}", state.units);
        }
        GerberCommandKind::Format => {
            let format = parse_format(payload, line_no)?;
            state.scalars = format.scalars();
            doc.format = Some(format);
        }
        GerberCommandKind::ApertureDefine => {
            let rest = payload.strip_prefix('D').ok_or_else(|| GerberError::UnknownApertureShape {
                shape: payload.to_string(),
            })?;
            let comments = mem::take(pending_comments);
            let aperture = factory.from_aperture_define(rest, comments)?;
            doc.insert_aperture(Rc::new(aperture));
        }
        GerberCommandKind::ApertureMacro => {
            factory.define_macro(payload)?;
        }
        GerberCommandKind::SetAperture => {
            let (_, index) = primitive::aperture_d_code(payload).map_err(|_| GerberError::UnknownApertureShape {
                shape: payload.to_string(),
            })?;
            state.current_aperture = Some(index);
        }
        GerberCommandKind::Operation(op_kind) => {
            process_operation(op_kind, payload, line_no, state, doc, region_buffer)?;
        }
        GerberCommandKind::InterpolationMode(mode) => {
            state.interpolation = mode;
            if !payload.is_empty() {
                return dispatch_line(
                    payload, line_no, strict, state, doc, factory, pending_comments, region_buffer,
                );
            }
        }
        GerberCommandKind::QuadrantMode(mode) => {
            state.quadrant_mode = mode;
            doc.quadrant_mode = Some(mode);
        }
        GerberCommandKind::Polarity => {
            state.polarity = parse_polarity(payload, line_no)?;
            doc.polarity = Some(state.polarity);
        }
        GerberCommandKind::RegionStart => {
            state.region = true;
            *region_buffer = Vec::new();
        }
        GerberCommandKind::RegionEnd => {
            state.region = false;
            let operations = mem::take(region_buffer);
            doc.regions.push(Region {
                operations,
                polarity: state.polarity,
            });
        }
        GerberCommandKind::AttributeFile => {
            doc.file_attributes.push(parse_attribute(payload));
        }
        GerberCommandKind::AttributeAperture | GerberCommandKind::AttributeObject | GerberCommandKind::AttributeDelete => {
            log::debug!("ignoring object/aperture/delete attribute: {payload}");
        }
        GerberCommandKind::DeprecatedUnitsInch => {
            state.units = Units::Inch;
            doc.units = Some(state.units);
            log::warn!("deprecated G70 (set units inch) at line {line_no}");
        }
        GerberCommandKind::DeprecatedUnitsMM => {
            state.units = Units::MM;
            doc.units = Some(state.units);
            log::warn!("deprecated G71 (set units mm) at line {line_no}");
        }
        GerberCommandKind::DeprecatedSelectAperture => {
            log::warn!("deprecated G54 (select aperture) at line {line_no}, ignored");
        }
        GerberCommandKind::DeprecatedProgramStop => {
            log::warn!("deprecated program stop at line {line_no}, ignored");
        }
        GerberCommandKind::EndOfFile => {
            return Ok(true);
        }
    }
    Ok(false)
}

fn normalize(payload: &str) -> &str {
    payload.trim_end_matches('*')
}

fn parse_units(payload: &str, line: usize) -> GerberResult<Units> {
    match payload {
        "MM" => Ok(Units::MM),
        "IN" => Ok(Units::Inch),
        other => Err(GerberError::BadFormat {
            line,
            text: other.to_string(),
        }),
    }
}

fn parse_polarity(payload: &str, line: usize) -> GerberResult<bool> {
    match payload {
        "D" => Ok(true),
        "C" => Ok(false),
        other => Err(GerberError::BadFormat {
            line,
            text: other.to_string(),
        }),
    }
}

fn parse_attribute(payload: &str) -> FileAttribute {
    match payload.split_once(',') {
        Some((name, rest)) => FileAttribute {
            name: name.to_string(),
            fields: rest.split(',').map(str::to_string).collect(),
        },
        None => FileAttribute {
            name: payload.to_string(),
            fields: Vec::new(),
        },
    }
}

/// `FSLAX<int><dec>Y<int><dec>`, head `FS` already stripped by the classifier.
fn parse_format(payload: &str, line: usize) -> GerberResult<CoordinateFormat> {
    fn grammar(input: &str) -> IResult<&str, (u32, u32, u32, u32)> {
        let (input, _) = nom::branch::alt((char('L'), char('T')))(input)?;
        let (input, _) = nom::branch::alt((char('A'), char('I')))(input)?;
        let (input, _) = char('X')(input)?;
        let (input, xi) = primitive::fixed_digits(1)(input)?;
        let (input, xd) = primitive::fixed_digits(1)(input)?;
        let (input, _) = char('Y')(input)?;
        let (input, yi) = primitive::fixed_digits(1)(input)?;
        let (input, yd) = primitive::fixed_digits(1)(input)?;
        Ok((input, (xi, xd, yi, yd)))
    }

    match grammar(payload) {
        Ok((_, (xi, xd, yi, yd))) => Ok(CoordinateFormat::new((xi, yi), (xd, yd))),
        Err(_) => Err(GerberError::BadFormat {
            line,
            text: payload.to_string(),
        }),
    }
}

fn process_operation(
    op_kind: crate::graphics::OperationKind,
    payload: &str,
    line: usize,
    state: &mut GraphicsState,
    doc: &mut GerberDocument,
    region_buffer: &mut Vec<Operation>,
) -> GerberResult<()> {
    let groups = if payload.is_empty() {
        Vec::new()
    } else {
        let (rest, groups) = primitive::coordinate_groups(payload).map_err(|_| GerberError::BadCoordinate {
            line,
            text: payload.to_string(),
        })?;
        if !rest.is_empty() {
            return Err(GerberError::BadCoordinate {
                line,
                text: payload.to_string(),
            });
        }
        groups
    };

    let previous_point = state.current_point.unwrap_or_default();
    let (sx, sy) = state.scalars;

    let mut x_raw = None;
    let mut y_raw = None;
    let mut i_raw = None;
    let mut j_raw = None;
    for (axis, value) in &groups {
        match axis {
            'X' => x_raw = Some(*value),
            'Y' => y_raw = Some(*value),
            'I' => i_raw = Some(*value),
            'J' => j_raw = Some(*value),
            _ => {
                return Err(GerberError::BadCoordinate {
                    line,
                    text: payload.to_string(),
                })
            }
        }
    }

    let endpoint = Point::new(
        x_raw.map(|v| v as f64 * sx).unwrap_or(previous_point.x),
        y_raw.map(|v| v as f64 * sy).unwrap_or(previous_point.y),
    );

    let point = match (i_raw, j_raw) {
        (Some(i), Some(j)) => {
            if state.interpolation == InterpolationMode::Linear {
                return Err(GerberError::BadCoordinate {
                    line,
                    text: payload.to_string(),
                });
            }
            OperationPoint::Arc(endpoint, Point::new(i as f64 * sx, j as f64 * sy))
        }
        (None, None) => OperationPoint::Point(endpoint),
        _ => {
            return Err(GerberError::BadCoordinate {
                line,
                text: payload.to_string(),
            })
        }
    };

    let aperture = if state.region {
        None
    } else {
        let index = state
            .current_aperture
            .ok_or(GerberError::NoAperture { line })?;
        Some(
            doc.aperture(index)
                .cloned()
                .ok_or(GerberError::NoAperture { line })?,
        )
    };

    let operation = Operation {
        kind: op_kind,
        state: OperationState {
            aperture,
            interpolation: state.interpolation,
            point,
            previous_point,
            polarity: state.polarity,
            quadrant_mode: state.quadrant_mode,
            scalars: state.scalars,
            units: state.units,
        },
    };

    if state.region {
        region_buffer.push(operation);
    } else {
        doc.operations.push(operation);
    }
    state.current_point = Some(endpoint);
    Ok(())
}
