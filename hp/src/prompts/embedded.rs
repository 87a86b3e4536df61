//! Embedded prompts
//!
//! These are compiled into the binary from .pmt files at build time.

/// Decomposition prompt (no resources available)
pub const DECOMPOSE: &str = include_str!("../../prompts/decompose.pmt");

/// Decomposition prompt with a resource overview section
pub const DECOMPOSE_RESOURCES: &str = include_str!("../../prompts/decompose-resources.pmt");

/// Plan revision prompt for new resource bindings
pub const UPDATE_RESOURCES: &str = include_str!("../../prompts/update-resources.pmt");

/// Result synthesis prompt for non-leaf nodes
pub const SYNTHESIZE: &str = include_str!("../../prompts/synthesize.pmt");

/// Single-task reasoning prompt
pub const REASON: &str = include_str!("../../prompts/reason.pmt");

/// Get the embedded prompt by name
pub fn get_embedded(name: &str) -> Option<&'static str> {
    match name {
        "decompose" => Some(DECOMPOSE),
        "decompose-resources" => Some(DECOMPOSE_RESOURCES),
        "update-resources" => Some(UPDATE_RESOURCES),
        "synthesize" => Some(SYNTHESIZE),
        "reason" => Some(REASON),
        _ => None,
    }
}
