//! Lintel AST - Syntax tree for policy modules
//!
//! The tree is produced by `lintel-parser` and consumed read-only by the
//! encoder and lint passes. Objects and sets expose their entries together
//! with key locations so consumers can recover source order themselves.

mod span;
mod value;
mod expr;
mod module;
mod annotations;

pub use span::*;
pub use value::*;
pub use expr::*;
pub use module::*;
pub use annotations::*;
