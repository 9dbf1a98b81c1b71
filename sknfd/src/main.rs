mod cidr;
mod daemon;
mod errors;
mod logging;
mod settings;
mod signals;

use clap::Parser;
use daemon::Daemon;
use errors::Error;
use log;
use settings::Args;
use settings::InstallTargets;
use signals::ShutdownListener;
use signals::ShutdownSignal;
use std::ffi::OsString;
use std::process::ExitCode;

/*
 * Program design:
 *
 *  1. Listen for SIGINT/SIGTERM before touching anything, so that a
 *     signal never interrupts an install step halfway.
 *  2. Figure out the pod CIDR this node was assigned.
 *  3. Install the CNI plugin binary and its conf on the host.
 *  4. Stay around until we are asked to leave, that is how the DaemonSet
 *     pod reports this node as ready.
 */
async fn run(args: Args) -> Result<(), Error> {
    let listener = ShutdownListener::register(&[ShutdownSignal::Interrupt, ShutdownSignal::Terminate])?;

    let mut me = Daemon::new(InstallTargets::default());
    let resolver = me.configure(args).await?;
    let report = me.install(&resolver).await?;
    log::info!("Node {} is ready with pod CIDR {} ({} placeholder(s) substituted)",
	      report.node, report.pod_cidr, report.placeholders);

    let sig = me.wait(listener.recv()).await?;
    log::info!("Stopped after {}", sig);

    Ok(())
}

/*
 * --help and --version print through clap and exit right away; any other
 * parse failure is a configuration error like the rest.
 */
fn parse_args<I, T>(argv: I) -> Result<Args, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    match Args::try_parse_from(argv) {
	Ok(args) => Ok(args),
	Err(err) if !err.use_stderr() => err.exit(),
	Err(err) => Err(Error::InvalidArguments(err)),
    }
}

/*
 * 0 after a clean shutdown, 1 for every failure; the logged message is the
 * only thing telling failures apart.
 */
fn exit_status(result: Result<(), Error>) -> u8 {
    match result {
	Ok(()) => 0,
	Err(err) => {
	    log::error!("{}", err);
	    1
	},
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    logging::init();

    let result = match parse_args(std::env::args_os()) {
	Ok(args) => run(args).await,
	Err(err) => Err(err),
    };
    ExitCode::from(exit_status(result))
}
