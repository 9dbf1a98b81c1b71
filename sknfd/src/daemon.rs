use crate::cidr::CidrResolver;
use crate::cidr::KubeNodeLookup;
use crate::cidr::NodeLookup;
use crate::errors::Error;
use crate::errors::Step;
use crate::logging::TAG;
use crate::settings::Args;
use crate::settings::CidrSource;
use crate::settings::DaemonConfig;
use crate::settings::InstallTargets;

use log;
use sknf_api::DaemonState;
use sknf_artifacts as artifacts;
use sknf_artifacts::Artifact;
use sknf_artifacts::template;
use std::future::Future;

/*
 * What ended up on the host after a successful install.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub node: String,
    pub pod_cidr: String,
    pub placeholders: usize,
}

/*
 * Daemon drives a single installer run:
 *
 *  1. configure(): merge env/flags with the defaults, connect to the cluster if needed
 *  2. install(): resolve the pod CIDR, copy the plugin binary, render and write its conf
 *  3. wait(): hold the process open until we are told to stop
 *
 * Any failure before Ready stops the daemon for good; the pod restart is
 * what retries.
 */
pub struct Daemon {
    state: DaemonState,
    targets: InstallTargets,
    config: Option<DaemonConfig>,
}

impl Daemon {

    pub fn new(targets: InstallTargets) -> Self {
	Self{
	    state: DaemonState::Starting,
	    targets: targets,
	    config: None,
	}
    }

    pub fn state(&self) -> DaemonState {
	self.state
    }

    fn transition(&mut self, next: DaemonState) {
	debug_assert!(self.state.can_transition_to(next), "illegal transition {} -> {}", self.state, next);

	log::debug!("State {} -> {}", self.state, next);
	self.state = next;
    }

    fn fail<T>(&mut self, err: Error) -> Result<T, Error> {
	self.transition(DaemonState::Stopped);
	Err(err)
    }

    pub async fn configure(&mut self, args: Args) -> Result<CidrResolver, Error> {
	if self.state != DaemonState::Starting {
	    return Err(Error::Other(format!("cannot configure while {}", self.state)));
	}
	self.transition(DaemonState::Configuring);

	let config = match DaemonConfig::resolve(args) {
	    Ok(config) => config,
	    Err(err) => return self.fail(err),
	};
	log::debug!("Resolved configuration: {:?}", config);

	let resolver = match &config.cidr_source {
	    CidrSource::Override(cidr) => {
		log::info!("Running standalone, pod CIDR is fixed to {}", cidr);
		CidrResolver::Override(cidr.clone())
	    },
	    CidrSource::Live => match KubeNodeLookup::connect().await {
		Ok(lookup) => CidrResolver::Live(lookup),
		Err(err) => return self.fail(err),
	    },
	};

	self.config = Some(config);
	Ok(resolver)
    }

    pub async fn install<L: NodeLookup>(&mut self, resolver: &CidrResolver<L>) -> Result<InstallReport, Error> {
	let config = match (&self.config, self.state) {
	    (Some(config), DaemonState::Configuring) => config.clone(),
	    _ => return Err(Error::Other(format!("cannot install while {}", self.state))),
	};

	self.transition(DaemonState::ResolvingCidr);
	let pod_cidr = match resolver.resolve(&config.node_name).await {
	    Ok(cidr) => cidr,
	    Err(err) => return self.fail(err),
	};

	println!("Node name: {}", config.node_name);
	println!("Pod CIDR: {}", pod_cidr);

	self.transition(DaemonState::Installing);
	let placeholders = match self.install_artifacts(&config, &pod_cidr) {
	    Ok(placeholders) => placeholders,
	    Err(err) => return self.fail(err),
	};

	self.transition(DaemonState::Ready);
	println!("{} Install complete; entering wait loop", TAG);

	Ok(InstallReport{
	    node: config.node_name,
	    pod_cidr: pod_cidr,
	    placeholders: placeholders,
	})
    }

    /*
     * Binary first, then the conf: once the runtime sees our conf in
     * net.d the plugin must already be in place.
     */
    fn install_artifacts(&self, config: &DaemonConfig, pod_cidr: &str) -> Result<usize, Error> {
	let binary = artifacts::Binary::new(
	    &config.plugin_binary, &self.targets.plugin_binary, self.targets.plugin_binary_mode,
	);
	binary.install().map_err(|source| Error::Install{ step: Step::CopyBinary, source })?;
	log::info!("Installed CNI plugin at {}", binary.destination().display());

	let conf_template = artifacts::read_to_string(&config.plugin_conf)
	    .map_err(|source| Error::Install{ step: Step::ReadTemplate, source })?;

	let placeholders = template::occurrences(&conf_template);
	if placeholders == 0 {
	    log::warn!("No {} in {}, installing it as is", template::SUBNET_PLACEHOLDER, config.plugin_conf.display());
	}
	log::debug!("Substituting {} placeholder(s) with {}", placeholders, pod_cidr);

	let conf = artifacts::ConfigFile::new(&template::render(&conf_template, pod_cidr), &self.targets.plugin_conf);
	conf.install().map_err(|source| Error::Install{ step: Step::WriteConfig, source })?;
	log::info!("Installed CNI plugin conf at {}", conf.destination().display());

	Ok(placeholders)
    }

    /*
     * Blocks until `shutdown` completes.  Nothing is written to the host
     * from here on.
     */
    pub async fn wait<F: Future>(&mut self, shutdown: F) -> Result<F::Output, Error> {
	if self.state != DaemonState::Ready {
	    return Err(Error::Other(format!("cannot wait while {}", self.state)));
	}

	let reason = shutdown.await;

	self.transition(DaemonState::ShuttingDown);
	println!("{} Received shutdown signal, exiting", TAG);
	self.transition(DaemonState::Stopped);

	Ok(reason)
    }
}
