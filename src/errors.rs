//! Error types for fallible public queries.
//!
//! Resolution itself never errors - malformed or missing input degrades
//! to safe defaults so one bad artefact cannot abort the pass. These
//! types cover the API edges where a caller asks for something that
//! genuinely does not exist.

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Diagnostic, Debug, Clone, PartialEq)]
pub enum QuirlError {
    /// A handle or name that does not resolve to a live artefact.
    #[error("unknown artefact: {name}")]
    #[diagnostic(code(quirl::canvas::unknown_artefact))]
    UnknownArtefact { name: String },

    /// Position-on-path query against an artefact without path data.
    #[error("artefact '{name}' is not usable as a path")]
    #[diagnostic(
        code(quirl::path::not_a_path),
        help("give the artefact a path definition and enable `use_as_path`")
    )]
    NotAPath { name: String },

    /// Arc-length query against a path whose total length is zero
    /// (for example one made only of move/close commands).
    #[error("path for '{name}' has zero total length")]
    #[diagnostic(code(quirl::path::degenerate))]
    DegeneratePath { name: String },

    /// An artefact may not pivot on, mimic, or follow itself.
    #[error("artefact '{name}' cannot reference itself")]
    #[diagnostic(code(quirl::canvas::self_reference))]
    SelfReference { name: String },
}
