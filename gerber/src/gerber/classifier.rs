//! Classifies a stripped Gerber command into a tagged kind plus its payload (§4.1).
//!
//! Grounded on the `GerberFormat.lookup` classmethod in the original
//! `format.py`/`standard/gerber.py`, adapted to the classification rules the
//! specification calls out explicitly (D01/D02/D03 vs. set-aperture, and the
//! embedded-coordinate operation form).

use crate::error::GerberError;
use crate::graphics::{InterpolationMode, OperationKind, QuadrantMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GerberCommandKind {
    Comment,
    Units,
    Format,
    ApertureDefine,
    ApertureMacro,
    SetAperture,
    Operation(OperationKind),
    InterpolationMode(InterpolationMode),
    QuadrantMode(QuadrantMode),
    Polarity,
    RegionStart,
    RegionEnd,
    AttributeFile,
    AttributeAperture,
    AttributeObject,
    AttributeDelete,
    DeprecatedUnitsInch,
    DeprecatedUnitsMM,
    DeprecatedSelectAperture,
    DeprecatedProgramStop,
    EndOfFile,
}

fn two_letter_head(head: &str) -> Option<GerberCommandKind> {
    use GerberCommandKind::*;
    Some(match head {
        "FS" => Format,
        "MO" => Units,
        "AD" => ApertureDefine,
        "AM" => ApertureMacro,
        "LP" => Polarity,
        "TF" => AttributeFile,
        "TA" => AttributeAperture,
        "TO" => AttributeObject,
        "TD" => AttributeDelete,
        _ => return None,
    })
}

fn three_char_head(head: &str) -> Option<GerberCommandKind> {
    use GerberCommandKind::*;
    Some(match head {
        "G04" => Comment,
        "G01" => InterpolationMode(InterpolationMode::Linear),
        "G02" => InterpolationMode(InterpolationMode::CW),
        "G03" => InterpolationMode(InterpolationMode::CCW),
        "G74" => QuadrantMode(QuadrantMode::Single),
        "G75" => QuadrantMode(QuadrantMode::Multi),
        "G36" => RegionStart,
        "G37" => RegionEnd,
        "G70" => DeprecatedUnitsInch,
        "G71" => DeprecatedUnitsMM,
        "G54" => DeprecatedSelectAperture,
        "M00" => DeprecatedProgramStop,
        "M01" => DeprecatedProgramStop,
        "M02" => EndOfFile,
        _ => return None,
    })
}

/// Classify one stripped command (no surrounding `%`, no trailing `*`).
pub fn classify(input: &str, line: usize) -> Result<(GerberCommandKind, &str), GerberError> {
    let bytes = input.as_bytes();
    if bytes.is_empty() {
        return Err(GerberError::UnknownCommand {
            line,
            command: input.to_string(),
        });
    }

    if bytes.len() >= 2 && (bytes[1] as char).is_ascii_alphabetic() {
        let head = &input[..2];
        if let Some(kind) = two_letter_head(head) {
            return Ok((kind, &input[2..]));
        }
    }

    if bytes[0] == b'D' && bytes.len() > 1 && (bytes[1] as char).is_ascii_digit() {
        let digit_end = 1 + input[1..]
            .as_bytes()
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        let code = &input[1..digit_end];
        return Ok(match code {
            "01" => (GerberCommandKind::Operation(OperationKind::Interp), &input[digit_end..]),
            "02" => (GerberCommandKind::Operation(OperationKind::Move), &input[digit_end..]),
            "03" => (GerberCommandKind::Operation(OperationKind::Flash), &input[digit_end..]),
            _ => (GerberCommandKind::SetAperture, input),
        });
    }

    if (bytes[0] == b'X' || bytes[0] == b'Y') && bytes.len() >= 3 {
        let tail = &input[input.len() - 3..];
        if let Some(kind @ GerberCommandKind::Operation(_)) = match tail {
            "D01" => Some(GerberCommandKind::Operation(OperationKind::Interp)),
            "D02" => Some(GerberCommandKind::Operation(OperationKind::Move)),
            "D03" => Some(GerberCommandKind::Operation(OperationKind::Flash)),
            _ => None,
        } {
            return Ok((kind, &input[..input.len() - 3]));
        }
    }

    if bytes.len() >= 3 {
        let head = &input[..3];
        if let Some(kind) = three_char_head(head) {
            return Ok((kind, &input[3..]));
        }
    }

    Err(GerberError::UnknownCommand {
        line,
        command: input.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use GerberCommandKind::*;

    #[test]
    fn test_two_letter_heads() {
        assert_eq!(classify("FSLAX26Y26", 0).unwrap().0, Format);
        assert_eq!(classify("MOMM", 0).unwrap().0, Units);
        assert_eq!(classify("ADD10C,0.5", 0).unwrap().0, ApertureDefine);
        assert_eq!(classify("AMDonut", 0).unwrap().0, ApertureMacro);
        assert_eq!(classify("LPD", 0).unwrap().0, Polarity);
        assert_eq!(classify("TF.Part,Single", 0).unwrap().0, AttributeFile);
    }

    #[test]
    fn test_set_aperture_vs_operation() {
        assert_eq!(classify("D10", 0).unwrap(), (SetAperture, "D10"));
        assert_eq!(classify("D01", 0).unwrap().0, Operation(OperationKind::Interp));
        assert_eq!(classify("D02", 0).unwrap().0, Operation(OperationKind::Move));
        assert_eq!(classify("D03", 0).unwrap().0, Operation(OperationKind::Flash));
    }

    #[test]
    fn test_embedded_coordinate_operation() {
        let (kind, payload) = classify("X1000000Y2000000D03", 0).unwrap();
        assert_eq!(kind, Operation(OperationKind::Flash));
        assert_eq!(payload, "X1000000Y2000000");
    }

    #[test]
    fn test_three_char_heads() {
        assert_eq!(classify("G36", 0).unwrap().0, RegionStart);
        assert_eq!(classify("G37", 0).unwrap().0, RegionEnd);
        assert_eq!(classify("M02", 0).unwrap().0, EndOfFile);
        assert_eq!(
            classify("G01X0Y0D02", 0).unwrap(),
            (InterpolationMode(InterpolationMode::Linear), "X0Y0D02")
        );
    }

    #[test]
    fn test_unknown_command() {
        assert!(classify("XX", 0).is_err());
        assert!(classify("ZZZ", 0).is_err());
    }
}
