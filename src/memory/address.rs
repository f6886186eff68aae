//! Synthetic addresses and the hex encoding shown in stack slots
//!
//! Heap identities get an [`Address`] from an [`AddressAllocator`]; everything
//! else a slot can hold is shown through its [`Encoded`] form, which looks like
//! an address but is never one.

use super::value::Value;
use std::fmt;

/// First address handed out in every run
pub const HEAP_ADDRESS_START: u64 = 0x1000;

/// A synthetic heap address
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Address(u64);

impl Address {
    pub fn new(raw: u64) -> Self {
        Address(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08X}", self.0)
    }
}

/// Issues strictly increasing addresses starting at [`HEAP_ADDRESS_START`]
#[derive(Debug, Clone)]
pub struct AddressAllocator {
    next: u64,
}

impl AddressAllocator {
    pub fn new() -> Self {
        AddressAllocator {
            next: HEAP_ADDRESS_START,
        }
    }

    /// Allocate the next address.
    ///
    /// The counter wraps on overflow; runs are nowhere near that size.
    pub fn next(&mut self) -> Address {
        let addr = Address(self.next);
        self.next = self.next.wrapping_add(1);
        addr
    }
}

impl Default for AddressAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// The pointer-like text a stack slot shows for its value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoded {
    Address(Address),
    Int(i64),
    FloatBits(u64), // IEEE-754 bit pattern of a non-integral number
    Bool(bool),
    Null,
    Undefined, // Never part of the address space
    Unknown,
}

/// Integers at or beyond this magnitude don't fit the i64 encoding
const I64_LIMIT: f64 = 9_223_372_036_854_775_808.0;

impl Encoded {
    /// Encode a non-reference value. Returns `None` for strings and containers,
    /// which need the identity registry.
    pub fn scalar(value: &Value) -> Option<Encoded> {
        let encoded = match value {
            Value::Undefined => Encoded::Undefined,
            Value::Null => Encoded::Null,
            Value::Bool(b) => Encoded::Bool(*b),
            Value::Int(n) => Encoded::Int(*n),
            Value::Float(n) => encode_float(*n),
            Value::Symbol(_) | Value::Opaque(_) => Encoded::Unknown,
            Value::Text(_) | Value::Array(_) | Value::Record(_) => return None,
        };
        Some(encoded)
    }

    /// The heap address, if this encoding is one
    pub fn address(&self) -> Option<Address> {
        match self {
            Encoded::Address(addr) => Some(*addr),
            _ => None,
        }
    }
}

fn encode_float(n: f64) -> Encoded {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < I64_LIMIT {
        Encoded::Int(n as i64)
    } else {
        Encoded::FloatBits(n.to_bits())
    }
}

impl fmt::Display for Encoded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Encoded::Address(addr) => write!(f, "{}", addr),
            Encoded::Int(n) if *n < 0 => write!(f, "-0x{:08X}", n.unsigned_abs()),
            Encoded::Int(n) => write!(f, "0x{:08X}", n),
            Encoded::FloatBits(bits) => write!(f, "0x{:016X}", bits),
            Encoded::Bool(true) => write!(f, "0x01"),
            Encoded::Bool(false) => write!(f, "0x00"),
            Encoded::Null => write!(f, "0x00000000"),
            Encoded::Undefined => write!(f, "0xUNDEFINED"),
            Encoded::Unknown => write!(f, "0xUNKNOWN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::value::Symbol;

    #[test]
    fn test_allocator_is_monotonic() {
        let mut alloc = AddressAllocator::new();
        let a = alloc.next();
        let b = alloc.next();
        assert_eq!(a.to_string(), "0x00001000");
        assert_eq!(b.to_string(), "0x00001001");
        assert!(a < b);
    }

    #[test]
    fn test_scalar_encodings() {
        let enc = |v: Value| Encoded::scalar(&v).unwrap().to_string();

        assert_eq!(enc(Value::Int(5)), "0x00000005");
        assert_eq!(enc(Value::Int(255)), "0x000000FF");
        assert_eq!(enc(Value::Int(-5)), "-0x00000005");
        assert_eq!(enc(Value::Float(0.5)), "0x3FE0000000000000");
        assert_eq!(enc(Value::Float(2.0)), "0x00000002");
        assert_eq!(enc(Value::Float(-0.0)), "0x00000000");
        assert_eq!(enc(Value::Bool(true)), "0x01");
        assert_eq!(enc(Value::Bool(false)), "0x00");
        assert_eq!(enc(Value::Null), "0x00000000");
        assert_eq!(enc(Value::Undefined), "0xUNDEFINED");
        assert_eq!(enc(Value::Symbol(Symbol::new(0, ""))), "0xUNKNOWN");
    }

    #[test]
    fn test_nan_uses_bit_pattern() {
        let encoded = Encoded::scalar(&Value::Float(f64::NAN)).unwrap();
        assert!(matches!(encoded, Encoded::FloatBits(_)));
        assert_eq!(encoded.to_string().len(), 18);
    }

    #[test]
    fn test_references_need_registry() {
        assert!(Encoded::scalar(&Value::Text("hi".into())).is_none());
        assert!(Encoded::Undefined.address().is_none());
    }
}
