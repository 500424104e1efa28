use crate::assets::CodeUnit;
use crate::instruction::Instruction;
use std::fmt;

/// Failure reported by the decoder/decompiler seam
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// The named code unit is not known to the backend
    MissingUnit(String),
    /// Bytecode decoding failed
    Decode(String),
    /// Decompilation failed
    Decompile(String),
    /// Flow-graph extraction failed
    Graph(String),
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BackendError::MissingUnit(name) => write!(f, "unknown code unit '{}'", name),
            BackendError::Decode(msg) => write!(f, "decode failed: {}", msg),
            BackendError::Decompile(msg) => write!(f, "decompile failed: {}", msg),
            BackendError::Graph(msg) => write!(f, "flow graph extraction failed: {}", msg),
        }
    }
}

impl std::error::Error for BackendError {}

/// The external decoder and decompiler, consumed as pure functions
///
/// Implementations own the bytecode; this crate never looks at raw
/// bytes. Every method may fail and failures are surfaced as rendered
/// error content, never panics.
pub trait Backend {
    /// Decode a code unit into its instruction sequence
    fn decode(&self, unit: &CodeUnit) -> Result<Vec<Instruction>, BackendError>;

    /// Full pre-serialized disassembly text of a code unit
    ///
    /// Used verbatim by the oversized-unit fast path.
    fn disassemble(&self, unit: &CodeUnit) -> Result<String, BackendError>;

    /// Decompile a code unit to source text
    fn decompile(&self, unit: &CodeUnit) -> Result<String, BackendError>;

    /// Textual flow-graph description (dot), for an external layout engine
    fn flow_graph(&self, unit: &CodeUnit) -> Result<String, BackendError>;
}
