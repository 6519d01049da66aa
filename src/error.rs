//! Error types used throughout zonegen.
//!
//! Errors during zone construction are described by [`GenerateError`], which
//! carries enough context (zone name, offending record name) to locate the
//! bad input in the source configuration. Once an error has been logged,
//! the unit type [`Failed`] is passed up instead so callers don't report it
//! twice.

use std::fmt;
use std::net::AddrParseError;

use ipnet::Ipv4Net;

use crate::zones::record::RecordType;

//------------ GenerateError -------------------------------------------------

/// An error encountered while building a zone.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum GenerateError {
    /// A record spec references an inventory host that does not exist.
    UnknownHost {
        /// The zone being built.
        zone: Box<str>,

        /// The name of the offending record.
        record: Box<str>,

        /// The host identifier that could not be resolved.
        host: Box<str>,
    },

    /// A record spec declared a type that is not a valid record type.
    InvalidRecordType {
        /// The zone being built.
        zone: Box<str>,

        /// The name of the offending record.
        record: Box<str>,

        /// The type string as given in the configuration.
        value: Box<str>,
    },

    /// Reverse linkage was requested for a record that is not an address
    /// record. This is a contract violation: only A and AAAA records can
    /// have a PTR record derived from them.
    InvalidReverseType {
        /// The zone being built.
        zone: Box<str>,

        /// The name of the offending record.
        record: Box<str>,

        /// The type the record actually has.
        rtype: RecordType,
    },

    /// A record spec is missing a field required by its kind.
    IncompleteSpec {
        /// The zone being built.
        zone: Box<str>,

        /// The name of the offending record.
        record: Box<str>,

        /// The name of the missing field.
        field: &'static str,
    },

    /// A literal IP address failed to parse.
    AddressParse {
        /// The zone being built.
        zone: Box<str>,

        /// The name of the offending record.
        record: Box<str>,

        /// The literal value that failed to parse.
        value: Box<str>,

        /// The underlying parse error.
        error: AddrParseError,
    },

    /// An IPv4 block has a prefix length no reverse zone can be built for.
    PrefixLength {
        /// The offending block.
        net: Ipv4Net,
    },
}

impl fmt::Display for GenerateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenerateError::UnknownHost { zone, record, host } => {
                write!(
                    f,
                    "zone {zone}: record '{record}' references \
                     unknown host '{host}'"
                )
            }
            GenerateError::InvalidRecordType { zone, record, value } => {
                write!(
                    f,
                    "zone {zone}: record '{record}' has invalid \
                     record type '{value}'"
                )
            }
            GenerateError::InvalidReverseType { zone, record, rtype } => {
                write!(
                    f,
                    "zone {zone}: cannot derive a PTR record for \
                     '{record}': expected type A or AAAA, found {rtype}"
                )
            }
            GenerateError::IncompleteSpec { zone, record, field } => {
                write!(
                    f,
                    "zone {zone}: record '{record}' is missing the \
                     required field '{field}'"
                )
            }
            GenerateError::AddressParse { zone, record, value, error } => {
                write!(
                    f,
                    "zone {zone}: record '{record}' has a malformed \
                     address '{value}': {error}"
                )
            }
            GenerateError::PrefixLength { net } => {
                write!(
                    f,
                    "cannot build a reverse zone for {net}: the prefix \
                     length must be between 1 and 31"
                )
            }
        }
    }
}

impl std::error::Error for GenerateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GenerateError::AddressParse { error, .. } => Some(error),
            _ => None,
        }
    }
}

//------------ Failed --------------------------------------------------------

/// An operation has failed and the error has been logged.
///
/// This is used as the error type in places where the actual error has
/// already been reported to the user via logging and all that is left to do
/// is to stop.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Failed;

impl fmt::Display for Failed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("operation failed")
    }
}

impl std::error::Error for Failed {}

//------------ ExitError -----------------------------------------------------

/// An error happened that should cause the process to exit.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ExitError {
    /// Something has happened.
    ///
    /// This should be exit status 1.
    Generic,
}

impl From<Failed> for ExitError {
    fn from(_: Failed) -> ExitError {
        ExitError::Generic
    }
}

//------------ Terminate -----------------------------------------------------

/// A request to terminate the process with the given exit status.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Terminate(i32);

impl Terminate {
    /// Terminate with a successful exit status.
    pub fn normal() -> Self {
        Terminate(0)
    }

    /// Terminate with the given exit status.
    pub fn other(status: i32) -> Self {
        Terminate(status)
    }

    /// The exit status to terminate the process with.
    pub fn exit_status(self) -> i32 {
        self.0
    }
}

impl From<Failed> for Terminate {
    fn from(_: Failed) -> Terminate {
        Terminate(1)
    }
}

impl From<ExitError> for Terminate {
    fn from(err: ExitError) -> Terminate {
        match err {
            ExitError::Generic => Terminate(1),
        }
    }
}
