pub mod access;
pub mod assign;
pub mod binary;
pub mod unary;

// Most operations are `impl Interpreter` blocks; equality is also used on its own
pub use binary::strict_equals;
