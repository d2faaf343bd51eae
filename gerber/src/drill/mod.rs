//! The Excellon (NC-Drill) format: classifier, mode-machine parser, emitter, and builder.

pub mod builder;
pub mod classifier;
pub mod document;
pub mod emitter;
pub mod parser;
