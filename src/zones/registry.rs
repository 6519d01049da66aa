//! The zone registry.
//!
//! Every zone written during a run is registered here together with its
//! file name. At the end of the run the registry is rendered into a
//! nameserver configuration fragment listing all zones.

use std::fmt::Write;

//------------ ZoneRegistry --------------------------------------------------

/// The zones created during a generation run, in creation order.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ZoneRegistry {
    /// The registered (zone name, file name) pairs.
    entries: Vec<Entry>,
}

impl ZoneRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Default::default()
    }

    /// Registers a zone and the file it is stored in.
    pub fn add(&mut self, zone: impl Into<Box<str>>, file: impl Into<Box<str>>) {
        self.entries.push(Entry {
            zone: zone.into(),
            file: file.into(),
        });
    }

    /// The number of registered zones.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no zone has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the zone-registration file.
    ///
    /// One global options stanza naming the serving directory, followed by
    /// one zone stanza per registered zone in registration order.
    pub fn render(&self, zones_dir: &str) -> String {
        let mut out = String::new();
        let _ = write!(
            out,
            "\noptions {{\n    directory \"{zones_dir}\";\n}};\n"
        );
        for entry in &self.entries {
            let _ = write!(
                out,
                "\nzone \"{}\" {{\n    file \"{}\";\n}};\n",
                entry.zone, entry.file
            );
        }
        out
    }
}

//------------ Entry ---------------------------------------------------------

/// One registered zone.
#[derive(Clone, Debug, Eq, PartialEq)]
struct Entry {
    /// The zone name.
    zone: Box<str>,

    /// The name of the zone file.
    file: Box<str>,
}

//============ Tests =========================================================
