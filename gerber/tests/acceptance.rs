//! End-to-end scenarios from the specification's testable-properties list,
//! exercised through the public parser/emitter/builder API rather than the
//! per-module unit tests.

use assert_matches::assert_matches;
use indoc::indoc;

use gerber::aperture::ApertureShape;
use gerber::drill;
use gerber::error::{DrillError, GerberError};
use gerber::geometry::Point;
use gerber::gerber::builder::GerberBuilder;
use gerber::gerber::{emitter, parser};
use gerber::graphics::OperationKind;
use gerber::layer::LayerKind;

#[test]
fn scenario_minimal_circle_flash() {
    let source = indoc! {"
        %FSLAX26Y26*%
        %MOMM*%
        %ADD10C,0.5*%
        D10*
        X1000000Y2000000D03*
        M02*
    "};
    let doc = parser::parse(source, true).unwrap();
    assert_eq!(doc.operations.len(), 1);
    assert_eq!(doc.operations[0].kind, OperationKind::Flash);
    assert_eq!(doc.operations[0].state.point.endpoint(), Point::new(1.0, 2.0));
}

#[test]
fn scenario_unknown_command_strict_vs_lenient() {
    let source = indoc! {"
        %FSLAX26Y26*%
        %MOMM*%
        %XX*%
        %ADD10C,0.5*%
        D10*
        X0Y0D03*
        M02*
    "};
    assert_matches!(parser::parse(source, true), Err(GerberError::UnknownCommand { .. }));
    let doc = parser::parse(source, false).unwrap();
    assert_eq!(doc.operations.len(), 1);
}

#[test]
fn region_closure_invariant() {
    let source = indoc! {"
        %FSLAX26Y26*%
        %MOMM*%
        %G36*%
        X0Y0D02*
        X5000000Y0D01*
        X5000000Y5000000D01*
        X0Y0D01*
        %G37*%
        M02*
    "};
    let doc = parser::parse(source, true).unwrap();
    assert_eq!(doc.regions.len(), 1);
    let region = &doc.regions[0];
    assert!(region.operations.len() >= 3);
    assert_eq!(region.operations[0].kind, OperationKind::Move);
    assert!(region.operations.iter().all(|op| op.state.aperture.is_none()));
}

#[test]
fn aperture_exclusivity_invariant() {
    let source = indoc! {"
        %FSLAX26Y26*%
        %MOMM*%
        %ADD10C,0.5*%
        D10*
        %G36*%
        X0Y0D02*
        X1000000Y0D01*
        X1000000Y1000000D01*
        X0Y0D01*
        %G37*%
        X0Y0D03*
        M02*
    "};
    let doc = parser::parse(source, true).unwrap();
    assert!(doc.regions[0].operations.iter().all(|op| op.state.aperture.is_none()));
    assert!(doc.operations.iter().all(|op| op.state.aperture.is_some()));
}

#[test]
fn gerber_operation_stream_round_trip() {
    let source = indoc! {"
        %FSLAX26Y26*%
        %MOMM*%
        %AMROUNDRECT*
        21,1,$1,$2,0,0,0*%
        %ADD11ROUNDRECT,2X1*%
        %ADD10C,0.5*%
        D10*
        X0Y0D03*
        D11*
        X1000000Y1000000D03*
        M02*
    "};
    let doc = parser::parse(source, true).unwrap();
    let text = emitter::emit(&doc).unwrap();
    let reparsed = parser::parse(&text, true).unwrap();
    assert_eq!(reparsed.operations.len(), doc.operations.len());
    for (a, b) in reparsed.operations.iter().zip(&doc.operations) {
        assert_eq!(a.state.point, b.state.point);
        assert_eq!(a.state.aperture.as_ref().unwrap().shape, b.state.aperture.as_ref().unwrap().shape);
    }
}

#[test]
fn builder_round_trip_through_text() {
    let mut builder = GerberBuilder::new();
    builder.flash_at(ApertureShape::Circle { diameter: 0.3, cx: 0.0, cy: 0.0 }, Point::new(1.0, 1.0)).unwrap();
    builder.flash_at(ApertureShape::Circle { diameter: 0.6, cx: 0.0, cy: 0.0 }, Point::new(2.0, 2.0)).unwrap();
    builder.flash_at(ApertureShape::Circle { diameter: 0.3, cx: 0.0, cy: 0.0 }, Point::new(3.0, 3.0)).unwrap();
    let doc = builder.build();
    assert_eq!(doc.apertures.len(), 2, "the repeated 0.3 circle should reuse its aperture");

    let text = emitter::emit(&doc).unwrap();
    let reparsed = parser::parse(&text, true).unwrap();
    assert_eq!(reparsed.operations.len(), 3);
    assert_eq!(reparsed.operations[0].state.point.endpoint(), Point::new(1.0, 1.0));
    assert_eq!(reparsed.operations[2].state.point.endpoint(), Point::new(3.0, 3.0));
}

#[test]
fn scenario_drill_round_trip() {
    let source =
        "M48\nMETRIC\nT01C0.3\nT02C0.6\n%\nT01\nX100Y200\nX300Y400\nT02\nG00X500Y500\nM15\nG01X600Y500\nM16\nM30\n";
    let doc = drill::parser::parse(source, true).unwrap();
    let text = drill::emitter::emit(&doc);
    let reparsed = drill::parser::parse(&text, true).unwrap();
    assert_eq!(reparsed.operations, doc.operations);
}

#[test]
fn drill_mode_gating_rejects_rout_with_tool_up() {
    let source = "M48\nMETRIC\nT01C0.3\n%\nT01\nG00X0Y0\nG01X1Y1\nM30\n";
    assert_matches!(drill::parser::parse(source, true), Err(DrillError::ToolUp { .. }));
}

#[test]
fn layer_kind_classification() {
    for (ext, expected) in [
        ("drl", LayerKind::Drill),
        ("XLN", LayerKind::Drill),
        ("gtl", LayerKind::TopCopper),
        ("gbo", LayerKind::BottomSilk),
    ] {
        assert_eq!(LayerKind::from_extension(ext).unwrap(), expected);
    }
    assert!(LayerKind::from_extension("pdf").is_err());
}
