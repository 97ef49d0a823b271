use std::fs;
use std::path::{Path, PathBuf};

use lintel::ast::Module;

/// Directory holding the `.rego` fixtures
pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
}

/// Load a test fixture from tests/fixtures/
pub fn load_fixture(name: &str) -> String {
    let path = fixtures_dir().join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("Failed to load fixture {name}: {e}"))
}

/// Parse a fixture, failing the test with the parse error
pub fn parse_fixture(name: &str) -> Module {
    let source = load_fixture(name);
    lintel::parser::parse(&source).unwrap_or_else(|e| panic!("Failed to parse {name}: {e:?}"))
}
