//! Configuration for the generator.
//!
//! This module primarily contains the type [`Config`] that holds all the
//! configuration used. It is loaded from a TOML formatted file naming the
//! global DNS settings, the host inventory, and the per-domain record
//! specs, and is then adjusted from command line options.
//!
//! A minimal configuration file looks like this:
//!
//! ```toml
//! [settings]
//! ttl = 3600
//! nameserver_prefix = "ns1"
//! domain = "example.dn42"
//! zones_dir = "/etc/named/dns-zones"
//! ownnets4 = ["172.20.229.0/27"]
//! ownnets6 = ["fd86:bad:11b7::/48"]
//!
//! [hosts.router1]
//! ownip = "172.20.229.1"
//! ownip6 = "fd86:bad:11b7::1"
//! shortname = "gw"
//!
//! [records."example.dn42".www]
//! type = "host-alias"
//! target = "router1"
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::net::{Ipv4Addr, Ipv6Addr};
#[cfg(unix)]
use std::str::FromStr;

use camino::{Utf8Path, Utf8PathBuf};
use clap::{Arg, ArgAction, ArgMatches, Command};
use ipnet::{Ipv4Net, Ipv6Net};
use log::{error, LevelFilter};
use serde::Deserialize;
#[cfg(unix)]
use syslog::Facility;

use crate::error::Failed;

//------------ Config --------------------------------------------------------

/// Everything one generation run needs to know.
#[derive(Clone, Debug)]
pub struct Config {
    /// The TTL for all generated zones, in seconds.
    pub ttl: u32,

    /// The host-name prefix of the nameserver within the primary domain.
    pub nameserver_prefix: Box<str>,

    /// The primary domain. Inventory hosts get records on this zone.
    pub domain: Box<str>,

    /// The directory named in the rendered registration file.
    ///
    /// This is where the nameserver will look for zone files, which is not
    /// necessarily the directory the generator writes to.
    pub zones_dir: Box<str>,

    /// The IPv4 blocks to generate reverse zones for.
    pub ownnets4: Vec<Ipv4Net>,

    /// The IPv6 blocks to generate reverse zones for.
    pub ownnets6: Vec<Ipv6Net>,

    /// The host inventory.
    pub hosts: BTreeMap<Box<str>, Host>,

    /// The record specs for each forward domain.
    pub records: BTreeMap<Box<str>, BTreeMap<Box<str>, RecordSpecFile>>,

    /// The directory zone files are written to.
    pub out_dir: Utf8PathBuf,

    /// The path the zone-registration file is written to.
    pub named_conf: Utf8PathBuf,

    /// Whether to add records for inventory hosts to the primary domain.
    pub host_records: bool,

    /// The maximum log level to log.
    pub log_level: LevelFilter,

    /// The target to log to.
    pub log_target: LogTarget,
}

impl Config {
    /// Adds the configuration-related arguments to a clap command.
    pub fn config_args(cmd: Command) -> Command {
        cmd.args([
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("PATH")
                .default_value("zonegen.toml")
                .help("Read the inventory configuration from this file"),
            Arg::new("out-dir")
                .short('o')
                .long("out-dir")
                .value_name("DIR")
                .default_value("dns-zones")
                .help("Write zone files into this directory"),
            Arg::new("named-conf")
                .short('n')
                .long("named-conf")
                .value_name("PATH")
                .default_value("named.conf")
                .help("Write the zone-registration file to this path"),
            Arg::new("no-host-records")
                .long("no-host-records")
                .action(ArgAction::SetTrue)
                .help("Do not add records for inventory hosts to the primary domain"),
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .help("Log more information, twice for even more"),
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .action(ArgAction::Count)
                .conflicts_with("verbose")
                .help("Log less information, thrice for no information"),
            Arg::new("logfile")
                .long("logfile")
                .value_name("PATH")
                .help("Log to this file"),
            Arg::new("syslog")
                .long("syslog")
                .action(ArgAction::SetTrue)
                .help("Log to syslog"),
            Arg::new("syslog-facility")
                .long("syslog-facility")
                .value_name("FACILITY")
                .default_value("daemon")
                .help("Facility to use for syslog logging"),
        ])
    }

    /// Creates the configuration from command line matches.
    ///
    /// Loads the configuration file named by the `-c` option first and
    /// then applies the remaining command line options on top. Errors have
    /// been logged by the time this returns.
    pub fn from_arg_matches(matches: &ArgMatches) -> Result<Self, Failed> {
        let path = Utf8Path::new(
            matches
                .get_one::<String>("config")
                .expect("config has a default value"),
        );
        let spec = FileSpec::load(path).map_err(|err| {
            error!("failed to read config file '{path}': {err}");
            Failed
        })?;

        let mut config = spec.build();
        config.out_dir = matches
            .get_one::<String>("out-dir")
            .expect("out-dir has a default value")
            .into();
        config.named_conf = matches
            .get_one::<String>("named-conf")
            .expect("named-conf has a default value")
            .into();
        config.host_records = !matches.get_flag("no-host-records");
        config.apply_log_matches(matches)?;
        Ok(config)
    }

    /// Applies the logging-related command line options.
    fn apply_log_matches(&mut self, matches: &ArgMatches) -> Result<(), Failed> {
        // The default level is Info so that per-zone progress is visible.
        match (matches.get_count("verbose"), matches.get_count("quiet")) {
            (0, 0) => {}
            (1, _) => self.log_level = LevelFilter::Debug,
            (_, 0) => self.log_level = LevelFilter::Trace,
            (_, 1) => self.log_level = LevelFilter::Warn,
            (_, 2) => self.log_level = LevelFilter::Error,
            _ => self.log_level = LevelFilter::Off,
        }

        if let Some(path) = matches.get_one::<String>("logfile") {
            self.log_target = LogTarget::File(path.into());
        } else if matches.get_flag("syslog") {
            #[cfg(unix)]
            {
                let facility = matches
                    .get_one::<String>("syslog-facility")
                    .expect("syslog-facility has a default value");
                let facility =
                    Facility::from_str(facility).map_err(|_| {
                        error!("unknown syslog facility '{facility}'");
                        Failed
                    })?;
                self.log_target = LogTarget::Syslog(facility);
            }
            #[cfg(not(unix))]
            {
                error!("syslog logging is not supported on this platform");
                return Err(Failed);
            }
        }
        Ok(())
    }
}

//------------ LogTarget -----------------------------------------------------

/// The target to log to.
#[derive(Clone, Debug)]
pub enum LogTarget {
    /// Log to standard error.
    Stderr,

    /// Append logs to the given file.
    File(Utf8PathBuf),

    /// Log to syslog with the given facility.
    #[cfg(unix)]
    Syslog(Facility),
}

//------------ Host ----------------------------------------------------------

/// One host of the inventory.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct Host {
    /// The host's own IPv4 address.
    pub ownip: Ipv4Addr,

    /// The host's own IPv6 address.
    pub ownip6: Ipv6Addr,

    /// The short name under which the host appears in the primary domain.
    pub shortname: Box<str>,
}

//------------ RecordSpecFile ------------------------------------------------

/// A record spec as it appears in the configuration file.
///
/// Which fields are required depends on the `type` tag; this is checked
/// when the spec is resolved during forward-zone construction, so that the
/// error can name the offending zone and record.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct RecordSpecFile {
    /// The kind of spec: `host-alias`, `host-record`, or a record type.
    #[serde(rename = "type")]
    pub kind: Box<str>,

    /// The record target: a host identifier or literal record data.
    pub target: Option<Box<str>>,

    /// The IPv4 address literal of a `host-record`.
    pub ip4: Option<Box<str>>,

    /// The IPv6 address literal of a `host-record`.
    pub ip6: Option<Box<str>>,
}

//------------ FileSpec ------------------------------------------------------

/// The contents of the configuration file.
#[derive(Clone, Debug, Deserialize)]
struct FileSpec {
    /// The global settings.
    settings: SettingsSpec,

    /// The host inventory.
    #[serde(default)]
    hosts: BTreeMap<Box<str>, Host>,

    /// The record specs for each forward domain.
    #[serde(default)]
    records: BTreeMap<Box<str>, BTreeMap<Box<str>, RecordSpecFile>>,
}

/// The `[settings]` section of the configuration file.
#[derive(Clone, Debug, Deserialize)]
struct SettingsSpec {
    /// The TTL for all generated zones, in seconds.
    ttl: u32,

    /// The host-name prefix of the nameserver within the primary domain.
    nameserver_prefix: Box<str>,

    /// The primary domain.
    domain: Box<str>,

    /// The directory named in the rendered registration file.
    zones_dir: Box<str>,

    /// The IPv4 blocks to generate reverse zones for.
    #[serde(default)]
    ownnets4: Vec<Ipv4Net>,

    /// The IPv6 blocks to generate reverse zones for.
    #[serde(default)]
    ownnets6: Vec<Ipv6Net>,
}

impl FileSpec {
    /// Loads the configuration file.
    fn load(path: &Utf8Path) -> Result<Self, FileError> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    /// Parses the configuration file contents.
    fn parse(text: &str) -> Result<Self, FileError> {
        Ok(toml::from_str(text)?)
    }

    /// Builds the configuration, with defaults for the CLI-controlled parts.
    fn build(self) -> Config {
        Config {
            ttl: self.settings.ttl,
            nameserver_prefix: self.settings.nameserver_prefix,
            domain: self.settings.domain,
            zones_dir: self.settings.zones_dir,
            ownnets4: self.settings.ownnets4,
            ownnets6: self.settings.ownnets6,
            hosts: self.hosts,
            records: self.records,
            out_dir: "dns-zones".into(),
            named_conf: "named.conf".into(),
            host_records: true,
            log_level: LevelFilter::Info,
            log_target: LogTarget::Stderr,
        }
    }
}

//------------ FileError -----------------------------------------------------

/// An error in processing the configuration file.
#[derive(Debug)]
enum FileError {
    /// The file could not be loaded.
    Load(std::io::Error),

    /// The file could not be parsed.
    Parse(toml::de::Error),
}

impl fmt::Display for FileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileError::Load(error) => error.fmt(f),
            FileError::Parse(error) => error.fmt(f),
        }
    }
}

impl std::error::Error for FileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FileError::Load(error) => Some(error),
            FileError::Parse(error) => Some(error),
        }
    }
}

impl From<std::io::Error> for FileError {
    fn from(value: std::io::Error) -> Self {
        Self::Load(value)
    }
}

impl From<toml::de::Error> for FileError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

//============ Tests =========================================================

#[cfg(test)]
mod tests {
    use super::*;

    const FILE: &str = r#"
        [settings]
        ttl = 3600
        nameserver_prefix = "ns1"
        domain = "example.dn42"
        zones_dir = "/etc/named/dns-zones"
        ownnets4 = ["172.20.229.0/27", "172.20.229.112/28"]
        ownnets6 = ["fd86:bad:11b7::/48"]

        [hosts.router1]
        ownip = "172.20.229.1"
        ownip6 = "fd86:bad:11b7::1"
        shortname = "gw"

        [records."example.dn42".www]
        type = "host-alias"
        target = "router1"

        [records."example.dn42".uplink]
        type = "host-record"
        ip4 = "172.20.229.113"
        ip6 = "fd86:bad:11b7::113"
    "#;

    #[test]
    fn a_complete_file_parses() {
        let config = FileSpec::parse(FILE).unwrap().build();

        assert_eq!(config.ttl, 3600);
        assert_eq!(&*config.domain, "example.dn42");
        assert_eq!(config.ownnets4.len(), 2);
        assert_eq!(config.ownnets6.len(), 1);
        assert_eq!(
            config.hosts["router1"].ownip,
            "172.20.229.1".parse::<Ipv4Addr>().unwrap()
        );
        assert_eq!(&*config.hosts["router1"].shortname, "gw");

        let records = &config.records["example.dn42"];
        assert_eq!(&*records["www"].kind, "host-alias");
        assert_eq!(records["uplink"].ip4.as_deref(), Some("172.20.229.113"));
    }

    #[test]
    fn missing_settings_fail_to_parse() {
        let err = FileSpec::parse("[settings]\nttl = 3600\n").unwrap_err();
        assert!(matches!(err, FileError::Parse(_)));
    }

    #[test]
    fn malformed_cidr_values_fail_to_parse() {
        let text = FILE.replace("172.20.229.0/27", "172.20.229.0/33");
        assert!(matches!(
            FileSpec::parse(&text),
            Err(FileError::Parse(_))
        ));
    }
}
