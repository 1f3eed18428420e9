pub type Id = String;

/// Opaque parameter document attached to an instance. Any JSON value is accepted;
/// callers normally send an object of string keys.
pub type Parameters = serde_json::Value;
