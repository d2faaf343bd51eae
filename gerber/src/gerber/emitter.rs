//! Re-serialises a [`GerberDocument`] back into RS-274X text (§4.4).
//!
//! Grounded on `GerberLayer.write`/`aperture.py`'s `ApertureTemplate.to_gerber`
//! methods in the original source, generalised to key the aperture-switch
//! comparison on D-code index rather than object identity (§9, resolved).

use std::fmt::Write as _;

use crate::aperture::ApertureShape;
use crate::error::{GerberError, GerberResult};
use crate::geometry::CoordinateFormat;
use crate::gerber::document::GerberDocument;
use crate::graphics::{OperationKind, OperationPoint, Polarity, Units};

pub fn emit(doc: &GerberDocument) -> GerberResult<String> {
    let format = doc.format.unwrap_or_default();
    let units = doc.units.unwrap_or(Units::MM);
    let mut out = String::new();

    for comment in &doc.header_comments {
        writeln!(out, "G04{comment}*").unwrap();
    }

    writeln!(out, "%MO{}*%", units_token(units)).unwrap();
    writeln!(
        out,
        "%FSLAX{}{}Y{}{}*%",
        format.integer_digits.0, format.decimal_digits.0, format.integer_digits.1, format.decimal_digits.1
    )
    .unwrap();

    if let Some(quadrant) = doc.quadrant_mode {
        writeln!(out, "%{}*%", quadrant_token(quadrant)).unwrap();
    }

    for (name, macro_def) in &doc.macros {
        write!(out, "%AM{name}*\n").unwrap();
        let mut statements = macro_def.statements.iter().peekable();
        while let Some(statement) = statements.next() {
            write!(out, "{},{}*", statement.primitive.to_code(), statement.expression).unwrap();
            out.push_str(if statements.peek().is_some() { "\n" } else { "%\n" });
        }
    }

    for (index, aperture) in &doc.apertures {
        for comment in &aperture.comments {
            writeln!(out, "G04{comment}*").unwrap();
        }
        writeln!(out, "%ADD{}{}*%", index, aperture_definition_token(aperture)).unwrap();
    }

    writeln!(out, "%LP{}*%", polarity_token(doc.polarity.unwrap_or(true))).unwrap();

    let mut current_aperture: Option<i32> = None;
    for operation in &doc.operations {
        if let Some(aperture) = &operation.state.aperture {
            if current_aperture != Some(aperture.index) {
                writeln!(out, "D{}*", aperture.index).unwrap();
                current_aperture = Some(aperture.index);
            }
        }
        emit_operation(&mut out, operation.kind, &operation.state.point, &format)?;
    }

    for region in &doc.regions {
        writeln!(out, "%G36*%").unwrap();
        for operation in &region.operations {
            emit_operation(&mut out, operation.kind, &operation.state.point, &format)?;
        }
        writeln!(out, "%G37*%").unwrap();
    }

    writeln!(out, "M02*").unwrap();
    Ok(out)
}

fn emit_operation(
    out: &mut String,
    kind: OperationKind,
    point: &OperationPoint,
    format: &CoordinateFormat,
) -> GerberResult<()> {
    let (endpoint, arc_offset) = match point {
        OperationPoint::Point(p) => (*p, None),
        OperationPoint::Arc(p, offset) => (*p, Some(*offset)),
    };

    let x = format.encode_x(endpoint.x).ok_or(GerberError::Overflow {
        value: endpoint.x,
        digits: format.integer_digits.0,
    })?;
    let y = format.encode_y(endpoint.y).ok_or(GerberError::Overflow {
        value: endpoint.y,
        digits: format.integer_digits.1,
    })?;

    write!(out, "X{x}Y{y}").unwrap();
    if let Some(offset) = arc_offset {
        let i = format.encode_x(offset.x).ok_or(GerberError::Overflow {
            value: offset.x,
            digits: format.integer_digits.0,
        })?;
        let j = format.encode_y(offset.y).ok_or(GerberError::Overflow {
            value: offset.y,
            digits: format.integer_digits.1,
        })?;
        write!(out, "I{i}J{j}").unwrap();
    }

    let code = match kind {
        OperationKind::Interp => "D01",
        OperationKind::Move => "D02",
        OperationKind::Flash => "D03",
    };
    writeln!(out, "{code}*").unwrap();
    Ok(())
}

fn units_token(units: Units) -> &'static str {
    match units {
        Units::MM => "MM",
        Units::Inch => "IN",
    }
}

fn quadrant_token(mode: crate::graphics::QuadrantMode) -> &'static str {
    match mode {
        crate::graphics::QuadrantMode::Single => "G74",
        crate::graphics::QuadrantMode::Multi => "G75",
    }
}

fn polarity_token(polarity: Polarity) -> &'static str {
    if polarity {
        "D"
    } else {
        "C"
    }
}

/// Reconstruct the `<id><token>,<params>` body of an `AD` line. Apertures
/// instantiated from a macro carry their originating name and raw parameter
/// list (§9: `Aperture` alone cannot distinguish a built-in shape from a
/// macro-produced one with the same geometry, e.g. a macro-built rectangle).
fn aperture_definition_token(aperture: &crate::aperture::Aperture) -> String {
    if let Some(name) = &aperture.macro_name {
        let params = aperture
            .definition_params
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join("X");
        return format!("{name},{params}");
    }

    match &aperture.shape {
        ApertureShape::Circle { diameter, .. } => format!("C,{diameter}X{}", aperture.hole_diameter),
        ApertureShape::Rectangle { width, height, .. } => {
            format!("R,{width}X{height}X{}", aperture.hole_diameter)
        }
        ApertureShape::Obround { width, height, .. } => {
            format!("O,{width}X{height}X{}", aperture.hole_diameter)
        }
        ApertureShape::Polygon {
            diameter,
            vertices,
            rotation,
            ..
        } => format!("P,{diameter}X{vertices}X{rotation}X{}", aperture.hole_diameter),
        ApertureShape::Outline { .. } => {
            unreachable!("an Outline shape is only ever produced by a macro, which always sets macro_name")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gerber::parser;

    #[test]
    fn test_round_trip_modulo_interpolation_prologue() {
        let source = "%FSLAX26Y26*%\n%MOMM*%\n%ADD10C,0.5*%\nD10*\nX1000000Y2000000D03*\nM02*\n";
        let doc = parser::parse(source, true).unwrap();
        let text = emit(&doc).unwrap();
        let reparsed = parser::parse(&text, true).unwrap();
        assert_eq!(reparsed.operations.len(), doc.operations.len());
        assert_eq!(reparsed.operations[0].state.point, doc.operations[0].state.point);
    }

    #[test]
    fn test_overflow_on_emit() {
        let source = "%FSLAX22Y22*%\n%MOMM*%\n%ADD10C,0.5*%\nD10*\nX100000Y100000D03*\nM02*\n";
        let doc = parser::parse(source, true).unwrap();
        assert!(matches!(emit(&doc), Err(GerberError::Overflow { .. })));
    }
}
