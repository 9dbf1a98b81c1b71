use crate::errors::Error;

use clap::Parser;
use clap::ValueEnum;
use log;
use std::path::PathBuf;

pub const MODE_ENV_KEY: &str = "SKNF_MODE";
pub const NODE_NAME_ENV_KEY: &str = "NODE_NAME";
pub const CNI_PLUGIN_BINARY_PATH_ENV_KEY: &str = "CNI_PLUGIN_BINARY_PATH";
pub const CNI_PLUGIN_CONF_PATH_ENV_KEY: &str = "CNI_PLUGIN_CONF_PATH";
pub const POD_CIDR_ENV_KEY: &str = "POD_CIDR";

pub const CNI_PLUGIN_BINARY_PATH_DEFAULT: &str = "sknf-cni/bin/sknf-cni";
pub const CNI_PLUGIN_CONF_PATH_DEFAULT: &str = "sknf-cni/conf/sknf-conf.json";
pub const STANDALONE_NODE_NAME_DEFAULT: &str = "sknf-standalone";
pub const STANDALONE_POD_CIDR_DEFAULT: &str = "10.244.0.0/24";

pub const CNI_PLUGIN_BINARY_HOST_PATH: &str = "/host/opt/cni/bin/sknf-cni";
pub const CNI_PLUGIN_CONF_HOST_PATH: &str = "/host/etc/cni/net.d/sknf-conf.json";
pub const CNI_PLUGIN_BINARY_MODE: u32 = 0o755;

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Ask the cluster control plane for the node's pod CIDR
    Cluster,

    /// Skip the control plane, use --pod-cidr instead
    Standalone,
}

/*
 * Every option the installer understands.  Each one can be given as a flag
 * or through its env var.
 *
 * Values are taken as plain strings and only interpreted by
 * DaemonConfig::resolve(), so that an empty env var counts as unset
 * instead of being rejected by the parser.
 */
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "sknfd", version, about = "Installs the sknf CNI plugin on this node and waits")]
pub struct Args {

    /// Either `cluster` (ask the control plane) or `standalone` (use --pod-cidr) [default: cluster]
    #[arg(long, env = MODE_ENV_KEY)]
    pub mode: Option<String>,

    /// Node whose pod CIDR is installed (required in cluster mode)
    #[arg(long, env = NODE_NAME_ENV_KEY)]
    pub node_name: Option<String>,

    /// Where the CNI plugin binary is read from
    #[arg(long, env = CNI_PLUGIN_BINARY_PATH_ENV_KEY)]
    pub plugin_binary: Option<String>,

    /// Where the CNI plugin conf template is read from
    #[arg(long, env = CNI_PLUGIN_CONF_PATH_ENV_KEY)]
    pub plugin_conf: Option<String>,

    /// Pod CIDR to install (standalone mode only)
    #[arg(long, env = POD_CIDR_ENV_KEY)]
    pub pod_cidr: Option<String>,
}

/*
 * Where the pod CIDR comes from.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CidrSource {
    Live,
    Override(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DaemonConfig {
    pub node_name: String,
    pub plugin_binary: PathBuf,
    pub plugin_conf: PathBuf,
    pub cidr_source: CidrSource,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn path_or(value: Option<String>, default: &str) -> PathBuf {
    PathBuf::from(non_empty(value).unwrap_or_else(|| default.to_string()))
}

fn mode_of(value: Option<String>) -> Result<Mode, Error> {
    match non_empty(value) {
	None => Ok(Mode::Cluster),
	Some(value) => Mode::from_str(&value, true).map_err(|_| Error::ConfigurationInvalid{
	    key: MODE_ENV_KEY,
	    value: value,
	    expected: "cluster, standalone",
	}),
    }
}

impl DaemonConfig {

    pub fn resolve(args: Args) -> Result<Self, Error> {
	let mode = mode_of(args.mode)?;
	let node_name = non_empty(args.node_name);
	let pod_cidr = non_empty(args.pod_cidr);

	let (node_name, cidr_source) = match mode {
	    Mode::Cluster => {
		let node_name = node_name.ok_or(Error::ConfigurationMissing(NODE_NAME_ENV_KEY))?;
		if let Some(cidr) = pod_cidr {
		    log::warn!("Ignoring {}={} in cluster mode", POD_CIDR_ENV_KEY, cidr);
		}
		(node_name, CidrSource::Live)
	    },
	    Mode::Standalone => {
		let node_name = node_name.unwrap_or_else(|| STANDALONE_NODE_NAME_DEFAULT.to_string());
		let cidr = pod_cidr.unwrap_or_else(|| STANDALONE_POD_CIDR_DEFAULT.to_string());
		(node_name, CidrSource::Override(cidr))
	    },
	};

	Ok(Self{
	    node_name: node_name,
	    plugin_binary: path_or(args.plugin_binary, CNI_PLUGIN_BINARY_PATH_DEFAULT),
	    plugin_conf: path_or(args.plugin_conf, CNI_PLUGIN_CONF_PATH_DEFAULT),
	    cidr_source: cidr_source,
	})
    }
}

/*
 * The host side of the installation.  These are fixed; tests are the only
 * ones building something other than the default.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallTargets {
    pub plugin_binary: PathBuf,
    pub plugin_binary_mode: u32,
    pub plugin_conf: PathBuf,
}

impl Default for InstallTargets {
    fn default() -> Self {
	Self{
	    plugin_binary: PathBuf::from(CNI_PLUGIN_BINARY_HOST_PATH),
	    plugin_binary_mode: CNI_PLUGIN_BINARY_MODE,
	    plugin_conf: PathBuf::from(CNI_PLUGIN_CONF_HOST_PATH),
	}
    }
}
