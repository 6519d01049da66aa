//! The resource record model.
//!
//! A [`Record`] is one line of a zone file: an owner name relative to the
//! zone origin, a record type, and the record data. Records are immutable
//! once constructed and are rendered deterministically as
//! `"<name> IN <TYPE> <data>"`.

use std::fmt;
use std::str::FromStr;

//------------ RecordType ----------------------------------------------------

/// The type of a resource record.
///
/// The types the generator itself produces get their own variants; anything
/// else configured as a generic record is passed through via
/// [`RecordType::Other`], normalized to upper case.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RecordType {
    A,
    Aaaa,
    Ptr,
    Cname,
    Other(Box<str>),
}

impl RecordType {
    /// Whether this is an address record, i.e. A or AAAA.
    ///
    /// Only address records may carry reverse linkage.
    pub fn is_address(&self) -> bool {
        matches!(self, RecordType::A | RecordType::Aaaa)
    }

    /// The type as it appears in a zone file.
    pub fn as_str(&self) -> &str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Ptr => "PTR",
            RecordType::Cname => "CNAME",
            RecordType::Other(value) => value,
        }
    }
}

impl FromStr for RecordType {
    type Err = InvalidType;

    /// Parses a record type, case-insensitively.
    ///
    /// Accepts any ASCII-alphanumeric mnemonic and normalizes it to upper
    /// case. The data belonging to the type is not validated here; callers
    /// are responsible for passing pre-validated addresses and targets.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() || !s.bytes().all(|ch| ch.is_ascii_alphanumeric()) {
            return Err(InvalidType);
        }
        let upper = s.to_ascii_uppercase();
        Ok(match upper.as_str() {
            "A" => RecordType::A,
            "AAAA" => RecordType::Aaaa,
            "PTR" => RecordType::Ptr,
            "CNAME" => RecordType::Cname,
            _ => RecordType::Other(upper.into()),
        })
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//------------ InvalidType ---------------------------------------------------

/// A string could not be parsed into a [`RecordType`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct InvalidType;

impl fmt::Display for InvalidType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("invalid record type")
    }
}

impl std::error::Error for InvalidType {}

//------------ Record --------------------------------------------------------

/// A single resource record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Record {
    /// The owner name, relative to the zone origin.
    name: Box<str>,

    /// The record type.
    rtype: RecordType,

    /// The record data: an address, host name, or pointer target.
    data: Box<str>,
}

impl Record {
    /// Creates a new record.
    pub fn new(
        name: impl Into<Box<str>>,
        rtype: RecordType,
        data: impl Into<Box<str>>,
    ) -> Self {
        Record {
            name: name.into(),
            rtype,
            data: data.into(),
        }
    }

    /// The owner name, relative to the zone origin.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The record type.
    pub fn rtype(&self) -> &RecordType {
        &self.rtype
    }

    /// The record data.
    pub fn data(&self) -> &str {
        &self.data
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} IN {} {}", self.name, self.rtype, self.data)
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_parsing_is_case_insensitive() {
        assert_eq!("a".parse(), Ok(RecordType::A));
        assert_eq!("AAAA".parse(), Ok(RecordType::Aaaa));
        assert_eq!("ptr".parse(), Ok(RecordType::Ptr));
        assert_eq!("Cname".parse(), Ok(RecordType::Cname));
    }

    #[test]
    fn unknown_types_pass_through_upper_cased() {
        assert_eq!("mx".parse(), Ok(RecordType::Other("MX".into())));
        assert_eq!("TxT".parse(), Ok(RecordType::Other("TXT".into())));
    }

    #[test]
    fn malformed_types_are_rejected() {
        assert_eq!("".parse::<RecordType>(), Err(InvalidType));
        assert_eq!("A RECORD".parse::<RecordType>(), Err(InvalidType));
        assert_eq!("in-a".parse::<RecordType>(), Err(InvalidType));
    }

    #[test]
    fn only_addresses_take_reverse_linkage() {
        assert!(RecordType::A.is_address());
        assert!(RecordType::Aaaa.is_address());
        assert!(!RecordType::Ptr.is_address());
        assert!(!RecordType::Other("TXT".into()).is_address());
    }

    #[test]
    fn records_render_as_zone_file_lines() {
        let record = Record::new("gw", RecordType::A, "172.20.229.1");
        assert_eq!(record.to_string(), "gw IN A 172.20.229.1");

        let record = Record::new(
            "113",
            RecordType::Cname,
            "113.112/28.229.20.172.in-addr.arpa.",
        );
        assert_eq!(
            record.to_string(),
            "113 IN CNAME 113.112/28.229.20.172.in-addr.arpa."
        );
    }
}
