// Constants for the snippet executor

/// Largest array length a snippet may create
/// Writing `a[n]` pads with `undefined` up to `n`, so this bounds memory use
pub const MAX_ARRAY_LENGTH: usize = 1 << 20;

/// Deepest container nesting that `JSON.stringify` and string conversion walk
pub const MAX_VALUE_DEPTH: usize = 128;

/// Global names that resolve to builtins when no binding shadows them
pub const BUILTIN_GLOBALS: &[&str] = &[
    "console", "JSON", "Object", "String", "Symbol", "Infinity", "NaN",
];

/// Builtin globals that assignment leaves unchanged
pub const READ_ONLY_GLOBALS: &[&str] = &["Infinity", "NaN"];
