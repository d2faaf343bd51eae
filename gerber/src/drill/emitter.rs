//! Re-serialises a [`DrillDocument`] back into Excellon text (§4.6).
//!
//! Grounded on `NCDrill.write` in the original `standard/nc_drill.py`.

use std::fmt::Write as _;

use crate::drill::classifier::SegmentKind;
use crate::drill::document::{DrillDocument, DrillOperation};
use crate::graphics::Units;

pub fn emit(doc: &DrillDocument) -> String {
    let mut out = String::new();
    out.push_str("M48\n");
    out.push_str(match doc.units.unwrap_or(Units::MM) {
        Units::MM => "METRIC\n",
        Units::Inch => "INCH\n",
    });
    for (index, diameter) in &doc.tool_table {
        writeln!(out, "T{index:02}C{diameter}").unwrap();
    }
    out.push_str("%\n");

    let mut last_tool: Option<u32> = None;
    let mut last_was_rout = false;
    for op in &doc.operations {
        match op {
            DrillOperation::DrillHit { tool_index, point } => {
                if last_tool != Some(*tool_index) {
                    writeln!(out, "T{tool_index:02}").unwrap();
                    last_tool = Some(*tool_index);
                }
                if last_was_rout {
                    out.push_str("G05\n");
                }
                writeln!(out, "X{}Y{}", format_coordinate(point.x), format_coordinate(point.y)).unwrap();
                last_was_rout = false;
            }
            DrillOperation::RoutSegment { tool_index, segment_kind, point } => {
                if last_tool != Some(*tool_index) {
                    writeln!(out, "T{tool_index:02}").unwrap();
                    last_tool = Some(*tool_index);
                }
                let token = match segment_kind {
                    SegmentKind::Rapid => "G00",
                    SegmentKind::Linear => "G01",
                    SegmentKind::CW => "G02",
                    SegmentKind::CCW => "G03",
                };
                writeln!(
                    out,
                    "{token}X{}Y{}",
                    format_coordinate(point.x),
                    format_coordinate(point.y)
                )
                .unwrap();
                last_was_rout = true;
            }
            DrillOperation::ToolDown => out.push_str("M15\n"),
            DrillOperation::ToolUp => out.push_str("M16\n"),
        }
    }

    out.push_str("M30\n");
    out
}

/// Integer part zero-padded to width 6, matching the fixture coordinates in §8
/// scenario 5. Unlike rounding to the nearest integer, a fractional part (as
/// the parser's `xy_pair` already accepts, e.g. `X1.5Y-2.25`) is kept rather
/// than discarded, so the round-trip survives non-integer-unit files.
fn format_coordinate(value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let magnitude = value.abs();

    if (magnitude - magnitude.round()).abs() < 1e-9 {
        return format!("{sign}{:06}", magnitude.round() as i64);
    }

    let mut formatted = format!("{magnitude:.6}");
    while formatted.ends_with('0') {
        formatted.pop();
    }
    if formatted.ends_with('.') {
        formatted.push('0');
    }
    let (integer_part, fractional_part) = formatted.split_once('.').unwrap();
    format!("{sign}{integer_part:0>6}.{fractional_part}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drill::parser;

    const FIXTURE: &str =
        "M48\nMETRIC\nT01C0.3\nT02C0.6\n%\nT01\nX100Y200\nX300Y400\nT02\nG00X500Y500\nM15\nG01X600Y500\nM16\nM30\n";

    #[test]
    fn test_round_trip() {
        let original = parser::parse(FIXTURE, true).unwrap();
        let text = emit(&original);
        let reparsed = parser::parse(&text, true).unwrap();
        assert_eq!(reparsed.operations, original.operations);
    }

    #[test]
    fn test_fractional_coordinates_survive_round_trip() {
        let source = "M48\nMETRIC\nT01C0.3\n%\nT01\nX1.5Y-2.25\nM30\n";
        let original = parser::parse(source, true).unwrap();
        let text = emit(&original);
        let reparsed = parser::parse(&text, true).unwrap();
        assert_eq!(reparsed.operations, original.operations);
    }

    #[test]
    fn test_format_coordinate() {
        assert_eq!(format_coordinate(100.0), "000100");
        assert_eq!(format_coordinate(1.5), "000001.5");
        assert_eq!(format_coordinate(-2.25), "-000002.25");
        assert_eq!(format_coordinate(0.0), "000000");
    }
}
