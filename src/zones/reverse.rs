//! Building reverse (PTR) zones.
//!
//! An IPv4 block that sits on an octet boundary (/8, /16, /24) becomes a
//! single zone under `in-addr.arpa`. A block between two octet boundaries
//! cannot be a zone cut point by itself; per RFC 2317 it becomes a pair of
//! zones instead: a delegated zone named after the block (with a `/` in
//! its first label) carrying the actual PTR records, and the nearest
//! classful supernet's zone carrying one CNAME per address that points
//! into the delegated zone.
//!
//! IPv6 delegation happens on nibble boundaries, which are always legal
//! zone cut points, so a block becomes exactly one `ip6.arpa` zone.

use std::net::IpAddr;

use ipnet::{IpNet, Ipv4Net, Ipv6Net};

use crate::error::GenerateError;

use super::ptr::PtrIndex;
use super::record::{Record, RecordType};
use super::zone::{Zone, ZoneSettings};

//------------ Reverse-pointer names -----------------------------------------

/// The full reverse-pointer name of an address.
///
/// For IPv4 this is the four octets reversed under `in-addr.arpa`; for
/// IPv6 all 32 nibbles reversed under `ip6.arpa`.
pub fn reverse_pointer(addr: IpAddr) -> String {
    match addr {
        IpAddr::V4(addr) => {
            let [a, b, c, d] = addr.octets();
            format!("{d}.{c}.{b}.{a}.in-addr.arpa")
        }
        IpAddr::V6(addr) => {
            let mut labels = String::with_capacity(64);
            for byte in addr.octets().iter().rev() {
                labels.push(char::from_digit((byte & 0xf) as u32, 16).unwrap());
                labels.push('.');
                labels.push(char::from_digit((byte >> 4) as u32, 16).unwrap());
                labels.push('.');
            }
            format!("{labels}ip6.arpa")
        }
    }
}

/// The zone name for an octet-aligned IPv4 block.
///
/// Only the significant octets of the network address appear in the name;
/// the trailing zero octets of the network address are dropped, whether or
/// not a significant octet itself happens to be zero.
fn classful_zone_name(net: Ipv4Net) -> String {
    let octets = net.network().octets();
    let significant = (net.prefix_len() / 8) as usize;
    let mut name = String::new();
    for octet in octets[..significant].iter().rev() {
        name.push_str(&octet.to_string());
        name.push('.');
    }
    name.push_str("in-addr.arpa");
    name
}

/// The RFC 2317 zone name for a non-aligned IPv4 block.
///
/// The prefix length is attached to the last octet of the network
/// address, e.g. `112/28.229.20.172.in-addr.arpa` for 172.20.229.112/28.
fn rfc2317_zone_name(net: Ipv4Net) -> String {
    let [a, b, c, d] = net.network().octets();
    format!("{d}/{}.{c}.{b}.{a}.in-addr.arpa", net.prefix_len())
}

/// The zone name for an IPv6 block.
///
/// Leading zero nibbles of the reversed network address are stripped, but
/// never past the network boundary: a block whose network part ends in
/// zero nibbles keeps those labels.
fn nibble_zone_name(net: Ipv6Net) -> String {
    let significant = (net.prefix_len() as usize).div_ceil(4);
    let mut nibbles = Vec::with_capacity(32);
    for byte in net.network().octets().iter().rev() {
        nibbles.push(byte & 0xf);
        nibbles.push(byte >> 4);
    }
    let mut start = 0;
    while start < nibbles.len() - significant && nibbles[start] == 0 {
        start += 1;
    }
    if start == nibbles.len() {
        return "ip6.arpa".into();
    }
    let mut name = String::with_capacity(2 * (nibbles.len() - start) + 8);
    for nibble in &nibbles[start..] {
        name.push(char::from_digit(*nibble as u32, 16).unwrap());
        name.push('.');
    }
    name.push_str("ip6.arpa");
    name
}

/// Strips the zone origin off a reverse-pointer name.
fn relative_owner<'a>(reverse_ptr: &'a str, zone: &str) -> &'a str {
    match reverse_ptr.strip_suffix(zone) {
        Some(rest) => rest.strip_suffix('.').unwrap_or(rest),
        None => reverse_ptr,
    }
}

/// Ensures a pointer target is fully qualified.
fn fully_qualified(target: &str) -> String {
    if target.ends_with('.') {
        target.into()
    } else {
        format!("{target}.")
    }
}

//------------ build_ptr4_zones ----------------------------------------------

/// Builds the reverse zone(s) for an IPv4 block.
///
/// An octet-aligned block yields one zone; any other block yields the
/// RFC 2317 pair, delegated zone first. Only addresses with a PTR index
/// entry produce records, so a sparse block produces sparse zones.
pub fn build_ptr4_zones(
    net: Ipv4Net,
    index: &PtrIndex,
    settings: &ZoneSettings,
) -> Result<Vec<Zone>, GenerateError> {
    if net.prefix_len() == 0 || net.prefix_len() >= 32 {
        return Err(GenerateError::PrefixLength { net });
    }
    let net = net.trunc();

    if net.prefix_len() % 8 == 0 {
        let name = classful_zone_name(net);
        let mut zone = Zone::new(&*name, settings);
        for (addr, target) in index.entries_within(IpNet::V4(net)) {
            let ptr = reverse_pointer(addr);
            zone.push(Record::new(
                relative_owner(&ptr, &name),
                RecordType::Ptr,
                fully_qualified(target),
            ));
        }
        return Ok(vec![zone]);
    }

    // RFC 2317: delegate from the nearest classful supernet.
    let classful_len = net.prefix_len() / 8 * 8;
    let classful = Ipv4Net::new(net.network(), classful_len)
        .expect("the classful prefix is shorter than the block's")
        .trunc();
    let delegated_name = rfc2317_zone_name(net);
    let classful_name = classful_zone_name(classful);

    let mut delegated = Zone::new(&*delegated_name, settings);
    let mut classful_zone = Zone::new(&*classful_name, settings);
    for (addr, target) in index.entries_within(IpNet::V4(net)) {
        let ptr = reverse_pointer(addr);
        // The octets not shared with the classful zone name.
        let owner = relative_owner(&ptr, &classful_name);
        delegated.push(Record::new(
            owner,
            RecordType::Ptr,
            fully_qualified(target),
        ));
        classful_zone.push(Record::new(
            owner,
            RecordType::Cname,
            format!("{owner}.{delegated_name}."),
        ));
    }

    Ok(vec![delegated, classful_zone])
}

//------------ build_ptr6_zone -----------------------------------------------

/// Builds the reverse zone for an IPv6 block.
pub fn build_ptr6_zone(
    net: Ipv6Net,
    index: &PtrIndex,
    settings: &ZoneSettings,
) -> Zone {
    let net = net.trunc();
    let name = nibble_zone_name(net);
    let mut zone = Zone::new(&*name, settings);
    for (addr, target) in index.entries_within(IpNet::V6(net)) {
        let ptr = reverse_pointer(addr);
        zone.push(Record::new(
            relative_owner(&ptr, &name),
            RecordType::Ptr,
            fully_qualified(target),
        ));
    }
    zone
}

//============ Tests =========================================================
