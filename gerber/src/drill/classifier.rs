//! Tokenizes one Excellon (NC-Drill) command line into a tagged kind plus any
//! trailing payload (§4.5), mirroring the Gerber classifier's split of
//! "what kind of command is this" from "how does it mutate state."
//!
//! Grounded on the command dispatch in the original `standard/nc_drill.py`.

use crate::error::DrillError;
use crate::geometry::Point;
use crate::graphics::{InterpolationMode, Units};
use crate::primitive;

/// `Rapid` (`G00`, a tool-up repositioning move) is kept distinct from `Linear`
/// (`G01`, an engaged feed move) even though both trace a straight segment:
/// only the latter is subject to the tool-down gate (§8 "Mode gating"), and the
/// emitter needs the distinction to reconstruct the right G-code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Rapid,
    Linear,
    CW,
    CCW,
}

impl From<InterpolationMode> for SegmentKind {
    fn from(mode: InterpolationMode) -> Self {
        match mode {
            InterpolationMode::Linear => Self::Linear,
            InterpolationMode::CW => Self::CW,
            InterpolationMode::CCW => Self::CCW,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrillToken {
    Comment(String),
    Unit(Units),
    ToolDeclare { index: u32, diameter: f64 },
    ToolSelect(u32),
    FormatDirective,
    Absolute,
    ModeDrill,
    ModeRout,
    Interpolation(SegmentKind),
    ToolDown,
    ToolUp,
    End,
    Coordinates(Point),
}

/// Classify one trimmed, non-empty line. Returns the token plus any trailing
/// text left after consuming a mode/tool head (e.g. the coordinates in
/// `G00X500Y500`).
pub fn classify(line: &str, line_no: usize) -> Result<(DrillToken, &str), DrillError> {
    if let Some(comment) = line.strip_prefix(';') {
        return Ok((DrillToken::Comment(comment.to_string()), ""));
    }
    match line {
        "METRIC" => return Ok((DrillToken::Unit(Units::MM), "")),
        "INCH" => return Ok((DrillToken::Unit(Units::Inch), "")),
        "FMAT,2" => return Ok((DrillToken::FormatDirective, "")),
        "G90" => return Ok((DrillToken::Absolute, "")),
        "M30" => return Ok((DrillToken::End, "")),
        "M15" => return Ok((DrillToken::ToolDown, "")),
        "M16" => return Ok((DrillToken::ToolUp, "")),
        _ => {}
    }

    for (prefix, kind) in [
        ("G05", DrillToken::ModeDrill),
        ("G00", DrillToken::ModeRout),
        ("G01", DrillToken::Interpolation(SegmentKind::Linear)),
        ("G02", DrillToken::Interpolation(SegmentKind::CW)),
        ("G03", DrillToken::Interpolation(SegmentKind::CCW)),
    ] {
        if let Some(rest) = line.strip_prefix(prefix) {
            return Ok((kind, rest));
        }
    }

    if let Some(rest) = line.strip_prefix('T') {
        if let Some((index, diameter)) = parse_tool_declare(rest) {
            return Ok((DrillToken::ToolDeclare { index, diameter }, ""));
        }
        if let Ok((rest, index)) = primitive::unsigned_integer(rest) {
            if rest.is_empty() {
                return Ok((DrillToken::ToolSelect(index as u32), ""));
            }
        }
    }

    if line.starts_with('X') || line.starts_with('Y') {
        let (rest, (x, y)) = primitive::xy_pair(line).map_err(|_| DrillError::BadCoordinate {
            line: line_no,
            text: line.to_string(),
        })?;
        if !rest.is_empty() {
            return Err(DrillError::BadCoordinate {
                line: line_no,
                text: line.to_string(),
            });
        }
        return Ok((DrillToken::Coordinates(Point::new(x, y)), ""));
    }

    Err(DrillError::UnknownCommand {
        line: line_no,
        command: line.to_string(),
    })
}

/// `T(\d+)C([\d.]+)`.
fn parse_tool_declare(rest: &str) -> Option<(u32, f64)> {
    let digit_count = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digit_count == 0 {
        return None;
    }
    let (index_text, rest) = rest.split_at(digit_count);
    let rest = rest.strip_prefix('C')?;
    let index: u32 = index_text.parse().ok()?;
    let diameter: f64 = rest.parse().ok()?;
    Some((index, diameter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_tokens() {
        assert_eq!(classify("METRIC", 0).unwrap().0, DrillToken::Unit(Units::MM));
        assert_eq!(
            classify("T01C0.3", 0).unwrap().0,
            DrillToken::ToolDeclare { index: 1, diameter: 0.3 }
        );
        assert_eq!(classify("FMAT,2", 0).unwrap().0, DrillToken::FormatDirective);
    }

    #[test]
    fn test_mode_and_tool_select() {
        let (kind, rest) = classify("G00X500Y500", 0).unwrap();
        assert_eq!(kind, DrillToken::ModeRout);
        assert_eq!(rest, "X500Y500");
        assert_eq!(classify("T01", 0).unwrap().0, DrillToken::ToolSelect(1));
        assert_eq!(classify("T0", 0).unwrap().0, DrillToken::ToolSelect(0));
    }

    #[test]
    fn test_bare_coordinates() {
        assert_eq!(
            classify("X100Y200", 0).unwrap().0,
            DrillToken::Coordinates(Point::new(100.0, 200.0))
        );
    }

    #[test]
    fn test_unknown() {
        assert!(classify("ZQ1", 0).is_err());
    }
}
