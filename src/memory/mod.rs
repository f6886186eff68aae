//! Memory model for the diagram
//!
//! This module provides the core memory abstractions:
//! - [`value`]: tagged runtime values and the container arena
//! - [`address`]: synthetic addresses and the hex encoding of scalars
//! - [`registry`]: identity -> address registry and the heap graph builder
//! - [`format`]: heap node labels
//! - [`stack`]: the stack frame and its stack -> heap index
//!
//! # Address Space
//!
//! Addresses start at `0x1000` every run and increase by one per identity.
//! Strings share one address per distinct text; arrays and records get one per
//! instance. Scalars never get an address: a slot holding `5` shows
//! `0x00000005`, which looks like a pointer but points nowhere.

pub mod address;
pub mod format;
pub mod registry;
pub mod stack;
pub mod value;

pub use address::{Address, AddressAllocator, Encoded, HEAP_ADDRESS_START};
pub use format::ValueFormatter;
pub use registry::{HeapGraph, Identity, IdentityRegistry};
pub use stack::{Slot, StackModel};
pub use value::{Object, ObjectArena, ObjectId, Symbol, Value};
