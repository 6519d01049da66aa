//! Running a generation pass.
//!
//! A run is fully sequential: all forward zones are built first, which
//! populates the PTR index, then the reverse zones are built against the
//! completed index, and finally the zone registry is rendered. Each zone
//! is built in memory and written out in one piece; a failure part way
//! through the run leaves the zone files written so far on disk.

use std::fs;
use std::io::{self, Write};

use camino::Utf8Path;
use log::{error, info};

use crate::config::Config;
use crate::error::{ExitError, Failed, GenerateError};
use crate::process::Process;
use crate::zones::zone::{Zone, ZoneSettings};
use crate::zones::{forward, reverse, PtrIndex, ZoneRegistry};

//------------ prepare and run -----------------------------------------------

/// Initializes the process before configuration is available.
pub fn prepare() -> Result<(), ExitError> {
    Process::init()?;
    Ok(())
}

/// Runs one generation pass with the given configuration.
pub fn run(config: Config) -> Result<(), ExitError> {
    let process = Process::new(config);
    process.switch_logging()?;
    generate(process.config())?;
    Ok(())
}

//------------ generate ------------------------------------------------------

/// Generates all zones and the registration file.
fn generate(config: &Config) -> Result<(), Failed> {
    let settings = ZoneSettings::new(
        config.ttl,
        &config.nameserver_prefix,
        &config.domain,
    );
    let mut index = PtrIndex::new();
    let mut registry = ZoneRegistry::new();

    if let Err(err) = fs::create_dir_all(&config.out_dir) {
        error!(
            "failed to create output directory '{}': {}",
            config.out_dir, err
        );
        return Err(Failed);
    }

    // The forward pass. This fills the PTR index, so it has to complete
    // before any reverse zone is built.
    for (domain, specs) in &config.records {
        info!("writing forward zone for {domain}");
        let with_host_records =
            config.host_records && **domain == *config.domain;
        let zone = forward::build_zone(
            domain,
            specs,
            &config.hosts,
            &settings,
            with_host_records,
            &mut index,
        )
        .map_err(report)?;
        write_zone(config, &mut registry, &zone)?;
    }

    for net in &config.ownnets4 {
        let zones =
            reverse::build_ptr4_zones(*net, &index, &settings).map_err(report)?;
        for zone in &zones {
            info!("writing PTR zone {} for {}", zone.name(), net);
            write_zone(config, &mut registry, zone)?;
        }
    }
    for net in &config.ownnets6 {
        let zone = reverse::build_ptr6_zone(*net, &index, &settings);
        info!("writing PTR zone {} for {}", zone.name(), net);
        write_zone(config, &mut registry, &zone)?;
    }

    info!("writing {}", config.named_conf);
    let rendered = registry.render(&config.zones_dir);
    if let Err(err) = write_file(&config.named_conf, rendered.as_bytes()) {
        error!(
            "failed to write registration file '{}': {}",
            config.named_conf, err
        );
        return Err(Failed);
    }
    Ok(())
}

/// Logs a zone construction error.
fn report(err: GenerateError) -> Failed {
    error!("{err}");
    Failed
}

/// Registers a zone and writes its file into the output directory.
fn write_zone(
    config: &Config,
    registry: &mut ZoneRegistry,
    zone: &Zone,
) -> Result<(), Failed> {
    let file_name = zone.file_name();
    registry.add(zone.name(), &*file_name);
    let path = config.out_dir.join(&file_name);
    if let Err(err) = write_file(&path, zone.render().as_bytes()) {
        error!("failed to write zone file '{path}': {err}");
        return Err(Failed);
    }
    Ok(())
}

/// Atomically writes a file.
///
/// The contents are written to a temporary file next to the target which
/// is then renamed over it, so a crash never leaves a half-written zone
/// behind.
fn write_file(path: &Utf8Path, contents: &[u8]) -> io::Result<()> {
    let dir = path.parent().unwrap_or(Utf8Path::new("."));
    let mut tmp_file = tempfile::Builder::new().tempfile_in(dir)?;
    tmp_file.as_file_mut().write_all(contents)?;
    let _ = tmp_file.persist(path).map_err(|err| err.error)?;
    Ok(())
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::config::{Host, LogTarget, RecordSpecFile};
    use log::LevelFilter;

    fn test_config(out_dir: &Utf8Path) -> Config {
        let mut hosts = BTreeMap::new();
        hosts.insert(
            "router1".into(),
            Host {
                ownip: "172.20.229.1".parse().unwrap(),
                ownip6: "fd86:bad:11b7::1".parse().unwrap(),
                shortname: "gw".into(),
            },
        );
        let mut records = BTreeMap::new();
        records.insert("example.dn42".into(), BTreeMap::new());
        Config {
            ttl: 3600,
            nameserver_prefix: "ns1".into(),
            domain: "example.dn42".into(),
            zones_dir: "/etc/named/dns-zones".into(),
            ownnets4: vec![
                "172.20.229.0/24".parse().unwrap(),
                "172.20.230.112/28".parse().unwrap(),
            ],
            ownnets6: vec!["fd86:bad:11b7::/48".parse().unwrap()],
            hosts,
            records,
            out_dir: out_dir.into(),
            named_conf: out_dir.join("named.conf"),
            host_records: true,
            log_level: LevelFilter::Off,
            log_target: LogTarget::Stderr,
        }
    }

    fn uplink_record_spec() -> RecordSpecFile {
        RecordSpecFile {
            kind: "host-record".into(),
            target: None,
            ip4: Some("172.20.230.113".into()),
            ip6: Some("fd86:bad:11b7::113".into()),
        }
    }

    #[test]
    fn a_full_run_writes_all_zones_and_the_registry() {
        let tmp = tempfile::tempdir().unwrap();
        let out_dir = Utf8Path::from_path(tmp.path()).unwrap();
        let mut config = test_config(out_dir);
        config
            .records
            .get_mut("example.dn42")
            .unwrap()
            .insert("uplink".into(), uplink_record_spec());

        generate(&config).unwrap();

        let forward =
            fs::read_to_string(out_dir.join("example.dn42.zone")).unwrap();
        assert!(forward.contains("gw IN A 172.20.229.1\n"));
        assert!(forward.contains("gw IN AAAA fd86:bad:11b7::1\n"));
        assert!(forward.contains("uplink IN A 172.20.230.113\n"));

        // The /24 zone holds the PTR record of the inventory host.
        let aligned = fs::read_to_string(
            out_dir.join("229.20.172.in-addr.arpa.zone"),
        )
        .unwrap();
        assert!(aligned.contains("1 IN PTR gw.example.dn42.\n"));

        // The /28 produces the RFC 2317 pair; uplink is inside it.
        let delegated = fs::read_to_string(
            out_dir.join("112_28.230.20.172.in-addr.arpa.zone"),
        )
        .unwrap();
        assert!(delegated.contains("113 IN PTR uplink.example.dn42.\n"));
        let classful = fs::read_to_string(
            out_dir.join("230.20.172.in-addr.arpa.zone"),
        )
        .unwrap();
        assert!(classful.contains(
            "113 IN CNAME 113.112/28.230.20.172.in-addr.arpa.\n"
        ));

        let v6 = fs::read_to_string(
            out_dir.join("7.b.1.1.d.a.b.0.6.8.d.f.ip6.arpa.zone"),
        )
        .unwrap();
        assert!(v6.contains("IN PTR gw.example.dn42.\n"));

        let named_conf =
            fs::read_to_string(out_dir.join("named.conf")).unwrap();
        assert!(named_conf
            .starts_with("\noptions {\n    directory \"/etc/named/dns-zones\";\n};\n"));
        assert!(named_conf.contains("zone \"example.dn42\" {"));
        assert!(named_conf.contains("file \"example.dn42.zone\";"));
        assert!(named_conf
            .contains("zone \"112/28.230.20.172.in-addr.arpa\" {"));
    }

    #[test]
    fn two_runs_produce_identical_output() {
        let tmp = tempfile::tempdir().unwrap();
        let out_dir = Utf8Path::from_path(tmp.path()).unwrap();
        let config = test_config(out_dir);

        generate(&config).unwrap();
        let first =
            fs::read_to_string(out_dir.join("example.dn42.zone")).unwrap();
        let first_conf =
            fs::read_to_string(out_dir.join("named.conf")).unwrap();

        generate(&config).unwrap();
        let second =
            fs::read_to_string(out_dir.join("example.dn42.zone")).unwrap();
        let second_conf =
            fs::read_to_string(out_dir.join("named.conf")).unwrap();

        assert_eq!(first, second);
        assert_eq!(first_conf, second_conf);
    }

    #[test]
    fn every_indexed_address_lands_in_a_reverse_zone() {
        let tmp = tempfile::tempdir().unwrap();
        let out_dir = Utf8Path::from_path(tmp.path()).unwrap();
        let config = test_config(out_dir);

        let settings = ZoneSettings::new(
            config.ttl,
            &config.nameserver_prefix,
            &config.domain,
        );
        let mut index = PtrIndex::new();
        let zone = forward::build_zone(
            "example.dn42",
            &BTreeMap::new(),
            &config.hosts,
            &settings,
            true,
            &mut index,
        )
        .unwrap();
        assert_eq!(zone.records().len(), 2);
        assert_eq!(index.len(), 2);

        let mut covered = 0;
        for net in &config.ownnets4 {
            for zone in
                reverse::build_ptr4_zones(*net, &index, &settings).unwrap()
            {
                covered += zone
                    .records()
                    .iter()
                    .filter(|r| *r.rtype() == crate::zones::RecordType::Ptr)
                    .count();
            }
        }
        for net in &config.ownnets6 {
            let zone = reverse::build_ptr6_zone(*net, &index, &settings);
            covered += zone.records().len();
        }
        // One PTR for the v4 address (the /28 does not contain it) and one
        // for the v6 address.
        assert_eq!(covered, index.len());
    }
}
