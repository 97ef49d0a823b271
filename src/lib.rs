//! Lintel - Tooling for Rego-style policy sources
//!
//! This is the root workspace crate that provides integration tests.
//! The actual implementation is in the workspace member crates.

// Re-export main crates for convenience
pub use lintel_ast as ast;
pub use lintel_config as config;
pub use lintel_encoding as encoding;
pub use lintel_lexer as lexer;
pub use lintel_parser as parser;
