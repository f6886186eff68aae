//! Identity registry and heap graph builder
//!
//! [`IdentityRegistry`] hands every heap identity exactly one [`Address`]:
//! containers by arena handle, strings by content. [`HeapGraph`] walks values
//! and records which identities each container points at.
//!
//! # Dedup Policy
//!
//! Two structurally equal arrays get two addresses; two equal strings share
//! one. Strings are immutable and value-like, so the diagram treats every
//! occurrence of the same text as the same heap string.
//!
//! # Traversal
//!
//! [`HeapGraph::build`] uses an explicit worklist and a walked set, so cyclic
//! and deeply nested containers terminate without recursion. Addresses are
//! allocated in pre-order: a container first, then its children in iteration
//! order.

use super::address::{Address, AddressAllocator, Encoded};
use super::value::{ObjectArena, ObjectId, Value};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

/// Something that owns a heap address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Identity {
    Object(ObjectId),
    Text(String),
}

impl Identity {
    /// The identity behind a value, if it is reference-typed
    pub fn of(value: &Value) -> Option<Identity> {
        match value {
            Value::Array(id) | Value::Record(id) => Some(Identity::Object(*id)),
            Value::Text(s) => Some(Identity::Text(s.clone())),
            _ => None,
        }
    }
}

/// Maps identities to addresses; an identity is registered at most once
#[derive(Debug, Clone, Default)]
pub struct IdentityRegistry {
    allocator: AddressAllocator,
    objects: FxHashMap<ObjectId, Address>,
    texts: FxHashMap<String, Address>,
    order: Vec<(Identity, Address)>, // Allocation order
}

impl IdentityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a value to its slot encoding, allocating an address the first
    /// time a string or container is seen.
    pub fn resolve(&mut self, value: &Value) -> Encoded {
        if let Some(encoded) = Encoded::scalar(value) {
            return encoded;
        }
        match Identity::of(value) {
            Some(identity) => Encoded::Address(self.intern(identity)),
            None => Encoded::Unknown,
        }
    }

    /// Like [`resolve`](Self::resolve), but never allocates. Unregistered
    /// identities come back as [`Encoded::Unknown`].
    pub fn lookup(&self, value: &Value) -> Encoded {
        if let Some(encoded) = Encoded::scalar(value) {
            return encoded;
        }
        let addr = match value {
            Value::Array(id) | Value::Record(id) => self.objects.get(id).copied(),
            Value::Text(s) => self.texts.get(s.as_str()).copied(),
            _ => None,
        };
        addr.map_or(Encoded::Unknown, Encoded::Address)
    }

    fn intern(&mut self, identity: Identity) -> Address {
        if let Some(addr) = self.address_of(&identity) {
            return addr;
        }

        let addr = self.allocator.next();
        match &identity {
            Identity::Object(id) => {
                self.objects.insert(*id, addr);
            }
            Identity::Text(s) => {
                self.texts.insert(s.clone(), addr);
            }
        }
        trace!(%addr, ?identity, "allocated heap address");
        self.order.push((identity, addr));
        addr
    }

    pub fn address_of(&self, identity: &Identity) -> Option<Address> {
        match identity {
            Identity::Object(id) => self.objects.get(id).copied(),
            Identity::Text(s) => self.texts.get(s.as_str()).copied(),
        }
    }

    /// Registered identities in allocation order
    pub fn entries(&self) -> &[(Identity, Address)] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Directed points-to graph over heap identities
#[derive(Debug, Clone, Default)]
pub struct HeapGraph {
    registry: IdentityRegistry,
    edges: FxHashMap<Address, Vec<Identity>>,
    walked: FxHashSet<ObjectId>,
}

impl HeapGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `root` and everything reachable from it, recording one edge
    /// per distinct reference-typed child of each container.
    ///
    /// Idempotent: containers already walked are skipped, so building the
    /// same root twice changes nothing.
    pub fn build(&mut self, arena: &ObjectArena, root: &Value) {
        let mut pending = vec![root.clone()];

        while let Some(value) = pending.pop() {
            let Some(addr) = self.registry.resolve(&value).address() else {
                continue;
            };
            let Some(id) = value.object_id() else {
                continue; // strings have no children
            };
            if !self.walked.insert(id) {
                continue;
            }
            let Some(object) = arena.get(id) else {
                continue;
            };

            let children: Vec<&Value> = object.values().filter(|v| v.is_reference()).collect();
            let targets = self.edges.entry(addr).or_default();
            for child in &children {
                if let Some(identity) = Identity::of(child) {
                    if !targets.contains(&identity) {
                        targets.push(identity);
                    }
                }
            }

            // Reversed so the first child is allocated first
            pending.extend(children.into_iter().rev().cloned());
        }
    }

    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut IdentityRegistry {
        &mut self.registry
    }

    /// Addresses `source` points at, in child iteration order
    pub fn targets(&self, source: Address) -> Vec<Address> {
        self.edges
            .get(&source)
            .map(|targets| {
                targets
                    .iter()
                    .filter_map(|identity| self.registry.address_of(identity))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every edge, grouped by source in allocation order
    pub fn edges(&self) -> Vec<(Address, Address)> {
        self.registry
            .entries()
            .iter()
            .flat_map(|(_, source)| {
                self.targets(*source)
                    .into_iter()
                    .map(move |target| (*source, target))
            })
            .collect()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }
}
