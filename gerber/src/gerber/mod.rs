//! The Gerber X2 (RS-274X) format: classifier, modal parser, emitter, and builder.

pub mod builder;
pub mod classifier;
pub mod document;
pub mod emitter;
pub mod parser;
