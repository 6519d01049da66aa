//! Managing the process zonegen runs in.

use std::io;

use log::{error, LevelFilter};

use crate::config::{Config, LogTarget};
use crate::error::Failed;

//------------ Process -------------------------------------------------------

/// A representation of the process the generator runs in.
pub struct Process {
    config: Config,
}

impl Process {
    /// Initializes the process before the configuration is available.
    ///
    /// All diagnostic output is done via logging, never to stderr
    /// directly, so logging has to be up before anything else may fail.
    /// Until [`switch_logging`][Self::switch_logging] is called, only
    /// errors are logged, to stderr.
    pub fn init() -> Result<(), Failed> {
        Self::init_logging()
    }

    /// Creates a new process object from the finished configuration.
    pub fn new(config: Config) -> Self {
        Process { config }
    }

    /// Returns a reference to the config.
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// # Logging
///
impl Process {
    /// Initializes logging.
    fn init_logging() -> Result<(), Failed> {
        log::set_max_level(LevelFilter::Warn);
        if let Err(err) = log_reroute::init() {
            eprintln!("Failed to initialize logger: {}.\nAborting.", err);
            return Err(Failed);
        }
        let dispatch = fern::Dispatch::new()
            .level(LevelFilter::Error)
            .chain(io::stderr())
            .into_log()
            .1;
        log_reroute::reroute_boxed(dispatch);
        Ok(())
    }

    /// Switches logging to the configured target.
    pub fn switch_logging(&self) -> Result<(), Failed> {
        let logger = match self.config.log_target {
            LogTarget::Stderr => self.fern_logger(false).chain(io::stderr()),
            LogTarget::File(ref path) => {
                let file = match fern::log_file(path.as_std_path()) {
                    Ok(file) => file,
                    Err(err) => {
                        error!("failed to open log file '{path}': {err}");
                        return Err(Failed);
                    }
                };
                self.fern_logger(true).chain(file)
            }
            #[cfg(unix)]
            LogTarget::Syslog(facility) => self.syslog_logger(facility)?,
        };

        log_reroute::reroute_boxed(logger.into_log().1);
        log::set_max_level(self.config.log_level);
        Ok(())
    }

    /// Creates a syslog logger.
    #[cfg(unix)]
    fn syslog_logger(
        &self,
        facility: syslog::Facility,
    ) -> Result<fern::Dispatch, Failed> {
        let process = std::env::current_exe()
            .ok()
            .and_then(|path| {
                path.file_name()
                    .and_then(std::ffi::OsStr::to_str)
                    .map(ToString::to_string)
            })
            .unwrap_or_else(|| String::from("zonegen"));
        let formatter = syslog::Formatter3164 {
            facility,
            hostname: None,
            process,
            pid: nix::unistd::getpid().as_raw() as u32,
        };
        let logger = syslog::unix(formatter.clone())
            .or_else(|_| syslog::tcp(formatter.clone(), ("127.0.0.1", 601)))
            .or_else(|_| {
                syslog::udp(formatter, ("127.0.0.1", 0), ("127.0.0.1", 514))
            });
        match logger {
            Ok(logger) => Ok(self.fern_logger(false).chain(
                Box::new(syslog::BasicLogger::new(logger))
                    as Box<dyn log::Log>,
            )),
            Err(err) => {
                error!("cannot connect to syslog: {}", err);
                Err(Failed)
            }
        }
    }

    /// Creates and returns a fern logger.
    fn fern_logger(&self, timestamp: bool) -> fern::Dispatch {
        let mut res = fern::Dispatch::new();
        if timestamp {
            res = res.format(|out, message, record| {
                out.finish(format_args!(
                    "{} {} {}",
                    chrono::Local::now().format("[%Y-%m-%d %H:%M:%S]"),
                    record.module_path().unwrap_or(""),
                    message
                ))
            });
        }
        res.level(self.config.log_level)
    }
}

//============ Tests =========================================================

#[cfg(all(test, unix))]
mod tests {
    #[test]
    fn syslog_formatter_pid_is_the_process_id() {
        let formatter = syslog::Formatter3164 {
            facility: syslog::Facility::LOG_DAEMON,
            hostname: None,
            process: String::from("zonegen"),
            pid: nix::unistd::getpid().as_raw() as u32,
        };
        assert_eq!(formatter.pid, std::process::id());
    }
}
