//! Stack frame model
//!
//! This module provides the single stack frame a run displays:
//! - [`Slot`]: a named variable with its value and pointer-like encoding
//! - [`StackModel`]: the ordered slots plus the address -> slots index used to
//!   draw stack-to-heap arrows
//!
//! The model is rebuilt from scratch every run; it never diffs against the
//! previous one.

use super::address::{Address, Encoded};
use super::registry::IdentityRegistry;
use super::value::Value;
use indexmap::IndexMap;

/// A named stack slot
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub name: String,
    pub value: Value,
    pub encoded: Encoded,
}

impl Slot {
    /// Heap address this slot points at, if any
    pub fn address(&self) -> Option<Address> {
        self.encoded.address()
    }
}

/// The stack frame for one run
#[derive(Debug, Clone, Default)]
pub struct StackModel {
    slots: Vec<Slot>,
    referenced_by: IndexMap<Address, Vec<usize>>, // address -> slot indices
}

impl StackModel {
    /// Build the frame from ordered bindings, resolving each value against the
    /// registry. A repeated name overwrites the earlier slot in place.
    pub fn build(bindings: &[(String, Value)], registry: &mut IdentityRegistry) -> Self {
        let mut slots: Vec<Slot> = Vec::with_capacity(bindings.len());

        for (name, value) in bindings {
            let slot = Slot {
                name: name.clone(),
                value: value.clone(),
                encoded: registry.resolve(value),
            };
            match slots.iter_mut().find(|s| s.name == *name) {
                Some(existing) => *existing = slot,
                None => slots.push(slot),
            }
        }

        let mut referenced_by: IndexMap<Address, Vec<usize>> = IndexMap::new();
        for (index, slot) in slots.iter().enumerate() {
            if !slot.value.is_reference() {
                continue;
            }
            if let Some(addr) = slot.address() {
                referenced_by.entry(addr).or_default().push(index);
            }
        }

        StackModel {
            slots,
            referenced_by,
        }
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn get(&self, name: &str) -> Option<&Slot> {
        self.slots.iter().find(|s| s.name == name)
    }

    /// Address -> referencing slot indices, in first-reference order
    pub fn referenced_by(&self) -> &IndexMap<Address, Vec<usize>> {
        &self.referenced_by
    }

    /// Slots pointing at `addr`, in declaration order
    pub fn referrers(&self, addr: Address) -> &[usize] {
        self.referenced_by
            .get(&addr)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}
