//! In-memory zones and their serialization.
//!
//! A [`Zone`] accumulates records in processing order and is rendered to a
//! zone file in one go once complete. Keeping the zone as a value rather
//! than writing records straight to a file descriptor means tests can
//! assert on zone contents without touching the file system, and a
//! generation run on unchanged input produces byte-identical files.

use std::fmt;

use super::record::Record;

/// The SOA timers every generated zone uses.
///
/// The serial is fixed at 1; the generator always rewrites all zones from
/// scratch, so there is no previous serial to increment from.
const SOA_TIMERS: &str = "        1           ; serial
        7200        ; refresh period
        2400        ; retry period
        86400       ; expiration
        3600        ; minimum TTL";

//------------ ZoneSettings --------------------------------------------------

/// Settings shared by all zones of one generation run.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ZoneSettings {
    /// The TTL advertised in the `$TTL` directive.
    pub ttl: u32,

    /// The name of the primary nameserver for the SOA record.
    pub primary_ns: Box<str>,

    /// The responsible-party name for the SOA record.
    pub contact: Box<str>,
}

impl ZoneSettings {
    /// Creates the settings from the configured identity.
    ///
    /// The primary nameserver is `<nameserver_prefix>.<domain>`.
    pub fn new(ttl: u32, nameserver_prefix: &str, domain: &str) -> Self {
        ZoneSettings {
            ttl,
            primary_ns: format!("{nameserver_prefix}.{domain}").into(),
            contact: format!("placeholder-see-registry.{domain}").into(),
        }
    }
}

//------------ Zone ----------------------------------------------------------

/// A named zone with its accumulated records.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Zone {
    /// The zone name, also used as the `$ORIGIN`.
    name: Box<str>,

    /// The TTL for the `$TTL` directive.
    ttl: u32,

    /// The primary nameserver named in the SOA record.
    primary_ns: Box<str>,

    /// The responsible party named in the SOA record.
    contact: Box<str>,

    /// The records of this zone, in processing order.
    records: Vec<Record>,
}

impl Zone {
    /// Creates a new, empty zone.
    pub fn new(name: impl Into<Box<str>>, settings: &ZoneSettings) -> Self {
        Zone {
            name: name.into(),
            ttl: settings.ttl,
            primary_ns: settings.primary_ns.clone(),
            contact: settings.contact.clone(),
            records: Vec::new(),
        }
    }

    /// The zone name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The records accumulated so far.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Appends a record to the zone.
    pub fn push(&mut self, record: Record) {
        self.records.push(record)
    }

    /// The file name the zone is written under.
    ///
    /// RFC 2317 zone names contain a `/`, which cannot appear in a file
    /// name and is therefore replaced by `_`.
    pub fn file_name(&self) -> String {
        let mut name = self.name.replace('/', "_");
        name.push_str(".zone");
        name
    }

    /// Renders the complete zone file.
    pub fn render(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; Autogenerated by zonegen, do not edit!")?;
        writeln!(f, "$ORIGIN {}", self.name)?;
        writeln!(f, "$TTL {}", self.ttl)?;
        writeln!(
            f,
            "@   IN  SOA     {} {} (",
            self.primary_ns, self.contact
        )?;
        writeln!(f, "{SOA_TIMERS}")?;
        writeln!(f, ")")?;
        for record in &self.records {
            writeln!(f, "{record}")?;
        }
        Ok(())
    }
}

//============ Tests =========================================================
