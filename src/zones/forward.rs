//! Building forward zones.
//!
//! A forward zone is described by a mapping of record names to record
//! specs. A spec either aliases an inventory host, declares literal
//! addresses of its own, or is a generic record of an arbitrary type.
//! Address records with reverse linkage additionally register their
//! pointer target in the [`PtrIndex`] for the reverse pass.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::str::FromStr;

use crate::config::{Host, RecordSpecFile};
use crate::error::GenerateError;

use super::ptr::PtrIndex;
use super::record::{Record, RecordType};
use super::zone::{Zone, ZoneSettings};

//------------ RecordSpec ----------------------------------------------------

/// A resolved record spec.
///
/// This is the closed set of record kinds the generator knows; specs are
/// dispatched by a single match so that a new kind cannot be forgotten
/// anywhere.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RecordSpec {
    /// The record points at an inventory host's own addresses.
    ///
    /// Emits one A and one AAAA record, without reverse linkage.
    HostAlias {
        /// The inventory identifier of the referenced host.
        host: Box<str>,
    },

    /// The record declares literal addresses of its own.
    ///
    /// Emits one A and one AAAA record, each registered in the PTR index
    /// under `<record-name>.<domain>`.
    HostRecord {
        /// The IPv4 address literal.
        ip4: Box<str>,

        /// The IPv6 address literal.
        ip6: Box<str>,
    },

    /// A single record of an arbitrary type with a literal target.
    Generic {
        /// The record type.
        rtype: RecordType,

        /// The literal record data.
        data: Box<str>,
    },
}

impl RecordSpec {
    /// Resolves a raw configuration spec into a record spec.
    ///
    /// The `type` field selects the kind: `host-alias` and `host-record`
    /// are the structured kinds, anything else is taken to be a record
    /// type mnemonic for a generic record.
    pub fn resolve(
        zone: &str,
        record: &str,
        spec: &RecordSpecFile,
    ) -> Result<Self, GenerateError> {
        let field = |field, value: &Option<Box<str>>| {
            value.clone().ok_or_else(|| GenerateError::IncompleteSpec {
                zone: zone.into(),
                record: record.into(),
                field,
            })
        };
        match &*spec.kind {
            "host-alias" => Ok(RecordSpec::HostAlias {
                host: field("target", &spec.target)?,
            }),
            "host-record" => Ok(RecordSpec::HostRecord {
                ip4: field("ip4", &spec.ip4)?,
                ip6: field("ip6", &spec.ip6)?,
            }),
            other => {
                let rtype = RecordType::from_str(other).map_err(|_| {
                    GenerateError::InvalidRecordType {
                        zone: zone.into(),
                        record: record.into(),
                        value: other.into(),
                    }
                })?;
                Ok(RecordSpec::Generic {
                    rtype,
                    data: field("target", &spec.target)?,
                })
            }
        }
    }
}

//------------ build_zone ----------------------------------------------------

/// Builds a forward zone.
///
/// Produces one record per spec in `specs`. If `with_host_records` is set,
/// which the orchestrator does only for the primary domain, one A and one
/// AAAA record per inventory host is appended, keyed by the host's short
/// name and registered in the PTR index.
pub fn build_zone(
    domain: &str,
    specs: &BTreeMap<Box<str>, RecordSpecFile>,
    hosts: &BTreeMap<Box<str>, Host>,
    settings: &ZoneSettings,
    with_host_records: bool,
    index: &mut PtrIndex,
) -> Result<Zone, GenerateError> {
    let mut zone = Zone::new(domain, settings);

    for (name, raw) in specs {
        match RecordSpec::resolve(domain, name, raw)? {
            RecordSpec::HostAlias { host } => {
                let host = hosts.get(&*host).ok_or_else(|| {
                    GenerateError::UnknownHost {
                        zone: domain.into(),
                        record: name.clone(),
                        host: host.clone(),
                    }
                })?;
                zone.push(Record::new(
                    name.clone(),
                    RecordType::A,
                    host.ownip.to_string(),
                ));
                zone.push(Record::new(
                    name.clone(),
                    RecordType::Aaaa,
                    host.ownip6.to_string(),
                ));
            }
            RecordSpec::HostRecord { ip4, ip6 } => {
                push_with_reverse(
                    &mut zone, index, name, RecordType::A, &ip4, domain,
                )?;
                push_with_reverse(
                    &mut zone, index, name, RecordType::Aaaa, &ip6, domain,
                )?;
            }
            RecordSpec::Generic { rtype, data } => {
                zone.push(Record::new(name.clone(), rtype, data));
            }
        }
    }

    if with_host_records {
        for host in hosts.values() {
            push_with_reverse(
                &mut zone,
                index,
                &host.shortname,
                RecordType::A,
                &host.ownip.to_string(),
                domain,
            )?;
            push_with_reverse(
                &mut zone,
                index,
                &host.shortname,
                RecordType::Aaaa,
                &host.ownip6.to_string(),
                domain,
            )?;
        }
    }

    Ok(zone)
}

/// Appends an address record and registers its reverse mapping.
///
/// The pointer target is `<name>.<reverse_domain>`. Passing a record type
/// other than A or AAAA is a contract violation.
fn push_with_reverse(
    zone: &mut Zone,
    index: &mut PtrIndex,
    name: &str,
    rtype: RecordType,
    data: &str,
    reverse_domain: &str,
) -> Result<(), GenerateError> {
    if !rtype.is_address() {
        return Err(GenerateError::InvalidReverseType {
            zone: zone.name().into(),
            record: name.into(),
            rtype,
        });
    }
    let addr: IpAddr =
        data.parse().map_err(|error| GenerateError::AddressParse {
            zone: zone.name().into(),
            record: name.into(),
            value: data.into(),
            error,
        })?;
    index.record(addr, format!("{name}.{reverse_domain}"));
    zone.push(Record::new(name, rtype, data));
    Ok(())
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> ZoneSettings {
        ZoneSettings::new(3600, "ns1", "example.dn42")
    }

    fn spec(
        kind: &str,
        target: Option<&str>,
        ip4: Option<&str>,
        ip6: Option<&str>,
    ) -> RecordSpecFile {
        RecordSpecFile {
            kind: kind.into(),
            target: target.map(Into::into),
            ip4: ip4.map(Into::into),
            ip6: ip6.map(Into::into),
        }
    }

    fn inventory() -> BTreeMap<Box<str>, Host> {
        let mut hosts = BTreeMap::new();
        hosts.insert(
            "router1".into(),
            Host {
                ownip: "172.20.229.1".parse().unwrap(),
                ownip6: "fd00::1".parse().unwrap(),
                shortname: "gw".into(),
            },
        );
        hosts
    }

    #[test]
    fn host_records_emit_addresses_and_ptr_targets() {
        let mut specs = BTreeMap::new();
        specs.insert(
            "gw".into(),
            spec("host-record", None, Some("172.20.229.1"), Some("fd00::1")),
        );
        let mut index = PtrIndex::new();

        let zone = build_zone(
            "example.dn42",
            &specs,
            &BTreeMap::new(),
            &settings(),
            false,
            &mut index,
        )
        .unwrap();

        assert_eq!(
            zone.records(),
            &[
                Record::new("gw", RecordType::A, "172.20.229.1"),
                Record::new("gw", RecordType::Aaaa, "fd00::1"),
            ]
        );
        assert_eq!(
            index.lookup("172.20.229.1".parse().unwrap()),
            Some("gw.example.dn42")
        );
        assert_eq!(
            index.lookup("fd00::1".parse().unwrap()),
            Some("gw.example.dn42")
        );
    }

    #[test]
    fn host_aliases_resolve_without_reverse_linkage() {
        let mut specs = BTreeMap::new();
        specs.insert("www".into(), spec("host-alias", Some("router1"), None, None));
        let mut index = PtrIndex::new();

        let zone = build_zone(
            "example.dn42",
            &specs,
            &inventory(),
            &settings(),
            false,
            &mut index,
        )
        .unwrap();

        assert_eq!(
            zone.records(),
            &[
                Record::new("www", RecordType::A, "172.20.229.1"),
                Record::new("www", RecordType::Aaaa, "fd00::1"),
            ]
        );
        assert!(index.is_empty());
    }

    #[test]
    fn unknown_alias_targets_fail() {
        let mut specs = BTreeMap::new();
        specs.insert("www".into(), spec("host-alias", Some("router9"), None, None));
        let mut index = PtrIndex::new();

        let err = build_zone(
            "example.dn42",
            &specs,
            &inventory(),
            &settings(),
            false,
            &mut index,
        )
        .unwrap_err();

        assert_eq!(
            err,
            GenerateError::UnknownHost {
                zone: "example.dn42".into(),
                record: "www".into(),
                host: "router9".into(),
            }
        );
    }

    #[test]
    fn generic_specs_pass_their_type_through() {
        let mut specs = BTreeMap::new();
        specs.insert(
            "ftp".into(),
            spec("cname", Some("gw.example.dn42."), None, None),
        );
        let mut index = PtrIndex::new();

        let zone = build_zone(
            "example.dn42",
            &specs,
            &BTreeMap::new(),
            &settings(),
            false,
            &mut index,
        )
        .unwrap();

        assert_eq!(
            zone.records(),
            &[Record::new("ftp", RecordType::Cname, "gw.example.dn42.")]
        );
        assert!(index.is_empty());
    }

    #[test]
    fn the_primary_domain_gets_inventory_host_records() {
        let mut index = PtrIndex::new();

        let zone = build_zone(
            "example.dn42",
            &BTreeMap::new(),
            &inventory(),
            &settings(),
            true,
            &mut index,
        )
        .unwrap();

        assert_eq!(
            zone.records(),
            &[
                Record::new("gw", RecordType::A, "172.20.229.1"),
                Record::new("gw", RecordType::Aaaa, "fd00::1"),
            ]
        );
        assert_eq!(
            index.lookup("172.20.229.1".parse().unwrap()),
            Some("gw.example.dn42")
        );
    }

    #[test]
    fn malformed_addresses_fail_with_context() {
        let mut specs = BTreeMap::new();
        specs.insert(
            "gw".into(),
            spec("host-record", None, Some("172.20.229"), Some("fd00::1")),
        );
        let mut index = PtrIndex::new();

        let err = build_zone(
            "example.dn42",
            &specs,
            &BTreeMap::new(),
            &settings(),
            false,
            &mut index,
        )
        .unwrap_err();

        assert!(matches!(
            err,
            GenerateError::AddressParse { ref record, .. } if &**record == "gw"
        ));
    }

    #[test]
    fn incomplete_specs_fail_with_the_missing_field() {
        let mut specs = BTreeMap::new();
        specs.insert(
            "gw".into(),
            spec("host-record", None, Some("172.20.229.1"), None),
        );
        let mut index = PtrIndex::new();

        let err = build_zone(
            "example.dn42",
            &specs,
            &BTreeMap::new(),
            &settings(),
            false,
            &mut index,
        )
        .unwrap_err();

        assert_eq!(
            err,
            GenerateError::IncompleteSpec {
                zone: "example.dn42".into(),
                record: "gw".into(),
                field: "ip6",
            }
        );
    }

    #[test]
    fn malformed_type_strings_fail() {
        let err = RecordSpec::resolve(
            "example.dn42",
            "odd",
            &spec("not a type", Some("x"), None, None),
        )
        .unwrap_err();

        assert_eq!(
            err,
            GenerateError::InvalidRecordType {
                zone: "example.dn42".into(),
                record: "odd".into(),
                value: "not a type".into(),
            }
        );
    }

    #[test]
    fn reverse_linkage_requires_an_address_type() {
        let mut zone = Zone::new("example.dn42", &settings());
        let mut index = PtrIndex::new();

        let err = push_with_reverse(
            &mut zone,
            &mut index,
            "gw",
            RecordType::Cname,
            "target.example.dn42.",
            "example.dn42",
        )
        .unwrap_err();

        assert_eq!(
            err,
            GenerateError::InvalidReverseType {
                zone: "example.dn42".into(),
                record: "gw".into(),
                rtype: RecordType::Cname,
            }
        );
        assert!(zone.records().is_empty());
        assert!(index.is_empty());
    }
}
