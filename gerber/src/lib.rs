//! Parse and re-emit PCB fabrication files: Gerber X2 (RS-274X) graphics
//! layers and Excellon (NC-Drill) drill/rout files.
//!
//! ## Implementation Notes
//!
//! Both formats share the same shape: a line-oriented classifier splits a
//! command into a tagged kind and its payload, a stateful parser folds the
//! command stream into a document while threading a modal graphics/mode
//! state machine, and an emitter walks the document back out as text. The
//! round trip `parse(emit(parse(x)))` reproducing `parse(x)`'s operations is
//! the correctness contract for both formats (see the acceptance tests).
//!
//! Aperture macros are evaluated through a small hand-rolled arithmetic
//! expression evaluator (`macro_expr`) rather than by reparsing
//! parameter-substituted statement text, since the latter is lossy across
//! chained substitutions.

pub mod aperture;
pub mod drill;
pub mod error;
pub mod geometry;
pub mod gerber;
pub mod graphics;
pub mod layer;
pub mod macro_expr;
pub mod primitive;

pub use error::{DrillError, DrillResult, GerberError, GerberResult};
pub use layer::LayerKind;
