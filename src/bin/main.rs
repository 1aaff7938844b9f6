extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate roster;
extern crate shlex;

use std::env;
use std::io::Write;

use clap::Parser;
use color_eyre::eyre::Result;
use roster::prelude::*;

const EXIT_ERROR: i32 = 2;

//------------------------------------------------------------------------------
fn main() {
    env_logger::builder().format_timestamp_nanos().init();
    if let Err(err) = color_eyre::install() {
        eprintln!("{err}");
    }

    match real_main() {
        Ok(()) => (),
        Err(err) => {
            // downstream pipe closed
            if let Some(io) = err.downcast_ref::<std::io::Error>()
                && io.kind() == std::io::ErrorKind::BrokenPipe
            {
                std::process::exit(0)
            }
            eprintln!("{err:?}");
            std::process::exit(EXIT_ERROR)
        }
    }
}

fn parse_args() -> RosterOptions {
    let mut args: Vec<String> = env::args().take(1).collect();
    args.extend(
        env::var("ROSTER_DEFAULT_OPTIONS")
            .ok()
            .and_then(|val| shlex::split(&val))
            .unwrap_or_default(),
    );
    args.extend(env::args().skip(1));

    RosterOptions::parse_from(args).build()
}

fn real_main() -> Result<()> {
    let opts = parse_args();
    debug!("options: {opts:?}");

    let output = Roster::run_with(opts)?;
    info!("exiting with {} selected, {} viewed", output.selected.len(), output.viewed.len());

    let mut stdout = std::io::stdout().lock();
    for id in &output.selected {
        writeln!(stdout, "{id}")?;
    }
    stdout.flush()?;
    Ok(())
}
