//! The Excellon header/body parser and its drill-vs-rout mode machine (§4.5).
//!
//! Grounded on `NCDrill.read`'s two-phase line loop in the original
//! `standard/nc_drill.py`.

use crate::drill::classifier::{classify, DrillToken, SegmentKind};
use crate::drill::document::{DrillDocument, DrillOperation};
use crate::error::{DrillError, DrillResult};
use crate::primitive;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Drill,
    Rout,
}

pub fn parse(input: &str, strict: bool) -> DrillResult<DrillDocument> {
    let mut doc = DrillDocument::new();
    let mut lines = input.lines().enumerate().map(|(i, l)| (i + 1, l.trim()));

    match lines.next() {
        Some((_, "M48")) => {}
        Some((line, other)) => {
            return Err(DrillError::UnknownCommand {
                line,
                command: other.to_string(),
            })
        }
        None => return Ok(doc),
    }

    let mut in_header = true;
    let mut mode = Mode::Drill;
    let mut current_tool: Option<u32> = None;
    let mut tool_down = false;

    for (line_no, raw) in lines {
        if raw.is_empty() {
            continue;
        }

        if in_header {
            if raw == "%" {
                in_header = false;
                continue;
            }
            if let Err(err) = process_header_line(raw, line_no, &mut doc) {
                if strict {
                    return Err(err);
                }
                log::warn!("{err}");
            }
            continue;
        }

        if process_body_line(raw, line_no, &mut mode, &mut current_tool, &mut tool_down, &mut doc, strict)? {
            return Ok(doc);
        }
    }

    log::warn!("Excellon input ended without an M30 terminator");
    Ok(doc)
}

fn process_header_line(raw: &str, line_no: usize, doc: &mut DrillDocument) -> DrillResult<()> {
    let (token, _) = classify(raw, line_no)?;
    match token {
        DrillToken::Comment(text) => doc.comments.push(text),
        DrillToken::Unit(units) => doc.units = Some(units),
        DrillToken::ToolDeclare { index, diameter } => doc.tool_table.push((index, diameter)),
        DrillToken::FormatDirective | DrillToken::Absolute => {}
        other => {
            return Err(DrillError::UnknownCommand {
                line: line_no,
                command: format!("{other:?}"),
            })
        }
    }
    Ok(())
}

/// Returns `Ok(true)` once `M30` has been consumed.
fn process_body_line(
    raw: &str,
    line_no: usize,
    mode: &mut Mode,
    current_tool: &mut Option<u32>,
    tool_down: &mut bool,
    doc: &mut DrillDocument,
    strict: bool,
) -> DrillResult<bool> {
    let (token, rest) = match classify(raw, line_no) {
        Ok(pair) => pair,
        Err(err) => {
            if strict {
                return Err(err);
            }
            log::warn!("{err}");
            return Ok(false);
        }
    };

    match token {
        DrillToken::Comment(text) => doc.comments.push(text),
        DrillToken::Unit(units) => doc.units = Some(units),
        DrillToken::ToolDeclare { index, diameter } => doc.tool_table.push((index, diameter)),
        DrillToken::FormatDirective | DrillToken::Absolute => {}
        DrillToken::ModeDrill => *mode = Mode::Drill,
        DrillToken::ModeRout => {
            *mode = Mode::Rout;
            if !rest.is_empty() {
                let (_, point) = primitive::xy_pair(rest).map_err(|_| DrillError::BadCoordinate {
                    line: line_no,
                    text: rest.to_string(),
                })?;
                let tool_index = require_tool(*current_tool, doc, line_no)?;
                doc.operations.push(DrillOperation::RoutSegment {
                    tool_index,
                    segment_kind: SegmentKind::Rapid,
                    point: crate::geometry::Point::new(point.0, point.1),
                });
            }
        }
        DrillToken::ToolSelect(index) => {
            *current_tool = if index == 0 { None } else { Some(index) };
        }
        DrillToken::ToolDown => {
            *tool_down = true;
            doc.operations.push(DrillOperation::ToolDown);
        }
        DrillToken::ToolUp => {
            *tool_down = false;
            doc.operations.push(DrillOperation::ToolUp);
        }
        DrillToken::Interpolation(kind) => {
            if !*tool_down {
                return Err(DrillError::ToolUp { line: line_no });
            }
            let (_, point) = primitive::xy_pair(rest).map_err(|_| DrillError::BadCoordinate {
                line: line_no,
                text: rest.to_string(),
            })?;
            let tool_index = require_tool(*current_tool, doc, line_no)?;
            doc.operations.push(DrillOperation::RoutSegment {
                tool_index,
                segment_kind: kind,
                point: crate::geometry::Point::new(point.0, point.1),
            });
        }
        DrillToken::Coordinates(point) => {
            if *mode != Mode::Drill {
                return Err(DrillError::NotInDrillMode { line: line_no });
            }
            let tool_index = require_tool(*current_tool, doc, line_no)?;
            doc.operations.push(DrillOperation::DrillHit { tool_index, point });
        }
        DrillToken::End => return Ok(true),
    }
    Ok(false)
}

fn require_tool(current_tool: Option<u32>, doc: &DrillDocument, line: usize) -> DrillResult<u32> {
    let index = current_tool.ok_or(DrillError::UnknownTool { line, index: 0 })?;
    if doc.diameter_of(index).is_none() {
        return Err(DrillError::UnknownTool { line, index });
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drill::document::DrillOperation;
    use crate::geometry::Point;

    const FIXTURE: &str =
        "M48\nMETRIC\nT01C0.3\nT02C0.6\n%\nT01\nX100Y200\nX300Y400\nT02\nG00X500Y500\nM15\nG01X600Y500\nM16\nM30\n";

    #[test]
    fn test_drill_round_trip_scenario() {
        let doc = parse(FIXTURE, true).unwrap();
        assert_eq!(doc.tool_table, vec![(1, 0.3), (2, 0.6)]);
        assert_eq!(
            doc.operations,
            vec![
                DrillOperation::DrillHit { tool_index: 1, point: Point::new(100.0, 200.0) },
                DrillOperation::DrillHit { tool_index: 1, point: Point::new(300.0, 400.0) },
                DrillOperation::RoutSegment {
                    tool_index: 2,
                    segment_kind: SegmentKind::Rapid,
                    point: Point::new(500.0, 500.0)
                },
                DrillOperation::ToolDown,
                DrillOperation::RoutSegment {
                    tool_index: 2,
                    segment_kind: SegmentKind::Linear,
                    point: Point::new(600.0, 500.0)
                },
                DrillOperation::ToolUp,
            ]
        );
    }

    #[test]
    fn test_rout_segment_requires_tool_down() {
        let source = "M48\nMETRIC\nT01C0.3\n%\nT01\nG00X0Y0\nG01X1Y1\nM30\n";
        assert!(matches!(parse(source, true), Err(DrillError::ToolUp { .. })));
    }

    #[test]
    fn test_drill_hit_requires_drill_mode() {
        let source = "M48\nMETRIC\nT01C0.3\n%\nT01\nG00X0Y0\nX1Y1\nM30\n";
        assert!(matches!(parse(source, true), Err(DrillError::NotInDrillMode { .. })));
    }
}
