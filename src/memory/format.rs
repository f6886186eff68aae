//! Heap node labels
//!
//! [`ValueFormatter`] renders a value the way a heap node displays it: arrays
//! and records list their children, with strings and containers replaced by
//! their addresses. It only reads the registry; the graph must already be
//! built for children to show real addresses.

use super::registry::IdentityRegistry;
use super::value::{Object, ObjectArena, Value};

/// Format a number the way JavaScript's `Number#toString` does
pub fn js_number(n: f64) -> String {
    if n == 0.0 {
        return "0".to_string(); // -0 prints without its sign
    }
    let mut buffer = ryu_js::Buffer::new();
    buffer.format(n).to_string()
}

/// Literal text of a non-container value (`5`, `0.5`, `true`, `null`)
pub fn literal(value: &Value) -> String {
    match value {
        Value::Undefined => "undefined".to_string(),
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::Float(n) => js_number(*n),
        Value::Text(s) => s.clone(),
        Value::Symbol(symbol) => symbol.to_string(),
        Value::Opaque(description) => description.clone(),
        Value::Array(id) | Value::Record(id) => format!("<object {}>", id),
    }
}

/// Renders heap node labels against a built registry
pub struct ValueFormatter<'a> {
    arena: &'a ObjectArena,
    registry: &'a IdentityRegistry,
}

impl<'a> ValueFormatter<'a> {
    pub fn new(arena: &'a ObjectArena, registry: &'a IdentityRegistry) -> Self {
        ValueFormatter { arena, registry }
    }

    /// Label for a value
    pub fn format(&self, value: &Value) -> String {
        match value {
            Value::Array(id) | Value::Record(id) => match self.arena.get(*id) {
                Some(Object::Array(elements)) => {
                    let items: Vec<String> = elements.iter().map(|v| self.child(v)).collect();
                    format!("[{}]", items.join(", "))
                }
                Some(Object::Record(entries)) => {
                    let items: Vec<String> = entries
                        .iter()
                        .map(|(key, v)| format!("{}: {}", key, self.child(v)))
                        .collect();
                    format!("{{{}}}", items.join(", "))
                }
                None => "<unknown>".to_string(),
            },
            Value::Text(s) => format!("\"{}\"", s),
            other => literal(other),
        }
    }

    /// A child shows its address if it lives on the heap, else its literal
    fn child(&self, value: &Value) -> String {
        if value.is_reference() {
            self.registry.lookup(value).to_string()
        } else {
            literal(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::registry::HeapGraph;
    use crate::memory::value::Symbol;

    #[test]
    fn test_empty_containers() {
        let mut arena = ObjectArena::new();
        let arr = arena.alloc_array(vec![]);
        let rec = arena.alloc_record(vec![]);
        let registry = IdentityRegistry::new();
        let fmt = ValueFormatter::new(&arena, &registry);

        assert_eq!(fmt.format(&arr), "[]");
        assert_eq!(fmt.format(&rec), "{}");
    }

    #[test]
    fn test_scalars_and_strings() {
        let arena = ObjectArena::new();
        let registry = IdentityRegistry::new();
        let fmt = ValueFormatter::new(&arena, &registry);

        assert_eq!(fmt.format(&Value::Text("hi".into())), "\"hi\"");
        assert_eq!(fmt.format(&Value::Null), "null");
        assert_eq!(fmt.format(&Value::Undefined), "undefined");
        assert_eq!(fmt.format(&Value::Int(-3)), "-3");
        assert_eq!(fmt.format(&Value::Float(0.5)), "0.5");
        assert_eq!(fmt.format(&Value::Float(1e21)), "1e+21");
        assert_eq!(fmt.format(&Value::Float(f64::NAN)), "NaN");
        assert_eq!(fmt.format(&Value::Bool(false)), "false");
        assert_eq!(fmt.format(&Value::Symbol(Symbol::new(0, "k"))), "Symbol(k)");
        assert_eq!(fmt.format(&Value::Float(-0.0)), "0");
    }

    #[test]
    fn test_children_show_addresses() {
        let mut arena = ObjectArena::new();
        let inner = arena.alloc_record(vec![("k".to_string(), Value::Bool(true))]);
        let arr = arena.alloc_array(vec![
            Value::Int(1),
            Value::Text("s".into()),
            inner.clone(),
            Value::Null,
            Value::Undefined,
        ]);

        let mut graph = HeapGraph::new();
        graph.build(&arena, &arr);
        let fmt = ValueFormatter::new(&arena, graph.registry());

        assert_eq!(
            fmt.format(&arr),
            "[1, 0x00001001, 0x00001002, null, undefined]"
        );
        assert_eq!(fmt.format(&inner), "{k: true}");
    }

    #[test]
    fn test_record_keys_in_iteration_order() {
        let mut arena = ObjectArena::new();
        let rec = arena.alloc_record(vec![
            ("name".to_string(), Value::Text("a".into())),
            ("1".to_string(), Value::Float(1.5)),
        ]);

        let mut graph = HeapGraph::new();
        graph.build(&arena, &rec);
        let fmt = ValueFormatter::new(&arena, graph.registry());

        assert_eq!(fmt.format(&rec), "{1: 1.5, name: 0x00001001}");
    }
}
