//! The PTR index.
//!
//! While the forward zones are built, every address record that declares a
//! reverse domain registers its pointer target here. The reverse zone
//! builders then query the completed index for the addresses falling into
//! each of their blocks.

use std::collections::btree_map::{BTreeMap, Entry};
use std::net::IpAddr;

use ipnet::IpNet;
use log::warn;

//------------ PtrIndex ------------------------------------------------------

/// A mapping from IP addresses to their reverse-pointer targets.
///
/// Backed by an ordered map so that [`entries_within`][Self::entries_within]
/// yields addresses in address order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct PtrIndex {
    /// The pointer target for each registered address.
    entries: BTreeMap<IpAddr, Box<str>>,
}

impl PtrIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers the pointer target for an address.
    ///
    /// At most one entry per address is retained. Registering a different
    /// target for an already registered address keeps the later target but
    /// logs a warning, since two forward records mapping to the same
    /// address usually means a misconfigured inventory.
    pub fn record(&mut self, addr: IpAddr, target: impl Into<Box<str>>) {
        let target = target.into();
        match self.entries.entry(addr) {
            Entry::Vacant(entry) => {
                entry.insert(target);
            }
            Entry::Occupied(mut entry) => {
                if *entry.get() != target {
                    warn!(
                        "duplicate PTR target for {}: \
                         replacing '{}' with '{}'",
                        addr,
                        entry.get(),
                        target
                    );
                }
                entry.insert(target);
            }
        }
    }

    /// Returns the pointer target for an address, if one is registered.
    pub fn lookup(&self, addr: IpAddr) -> Option<&str> {
        self.entries.get(&addr).map(|target| &**target)
    }

    /// Returns all registered addresses inside the given block.
    ///
    /// Entries are yielded in address order. The iterator borrows the
    /// index, so the query can be rerun as often as needed.
    pub fn entries_within(
        &self,
        net: IpNet,
    ) -> impl Iterator<Item = (IpAddr, &str)> + '_ {
        let (first, last) = match net {
            IpNet::V4(net) => (
                IpAddr::V4(net.network()),
                IpAddr::V4(net.broadcast()),
            ),
            IpNet::V6(net) => (
                IpAddr::V6(net.network()),
                IpAddr::V6(net.broadcast()),
            ),
        };
        self.entries
            .range(first..=last)
            .map(|(addr, target)| (*addr, &**target))
    }

    /// The number of registered addresses.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//============ Tests =========================================================
