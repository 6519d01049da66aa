use std::process::exit;

use clap::{crate_authors, crate_version, error::ErrorKind, Command};

use zonegen::config::Config;
use zonegen::error::Terminate;
use zonegen::operation;

fn run_with_cmdline_args() -> Result<(), Terminate> {
    operation::prepare()?;

    let cmd = Command::new("zonegen")
        .version(crate_version!())
        .author(crate_authors!())
        .about("Generate DNS zone files from a network inventory")
        .next_line_help(true);
    let matches = Config::config_args(cmd).try_get_matches().map_err(|err| {
        let _ = err.print();
        match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                Terminate::normal()
            }
            _ => Terminate::other(2),
        }
    })?;

    let config = Config::from_arg_matches(&matches)?;
    operation::run(config)?;
    Ok(())
}

fn main() {
    match run_with_cmdline_args() {
        Ok(()) => exit(0),
        Err(terminate) => exit(terminate.exit_status()),
    }
}
