use lintel::ast::Module;
use serde_json::Value;

/// Encode a module and read the output back as generic JSON
pub fn encode_json(module: &Module) -> Value {
    let out = lintel::encoding::to_string(module).expect("Expected module to encode");
    serde_json::from_str(&out).expect("Encoder produced invalid JSON")
}

/// Every `"location"` string anywhere in `value`
pub fn collect_locations(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, v) in map {
                match (key.as_str(), v) {
                    ("location", Value::String(s)) => out.push(s.clone()),
                    _ => collect_locations(v, out),
                }
            }
        }
        Value::Array(items) => items.iter().for_each(|v| collect_locations(v, out)),
        _ => {}
    }
}

/// Assert a location string has the `row:col:endRow:endCol` shape with
/// the end never before the start
pub fn assert_valid_location(location: &str) {
    let parts: Vec<usize> = location
        .split(':')
        .map(|p| p.parse().unwrap_or_else(|_| panic!("bad location {location}")))
        .collect();

    assert_eq!(parts.len(), 4, "bad location {location}");
    assert!(parts[0] >= 1 && parts[1] >= 1, "bad location {location}");
    assert!(
        (parts[2], parts[3]) >= (parts[0], parts[1]),
        "location ends before it starts: {location}"
    );
}
