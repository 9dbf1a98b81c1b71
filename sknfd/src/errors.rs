use std::fmt;
use std::io;
use thiserror::Error;

/*
 * The install steps, named the way they show up in failure messages.
 */
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Step {
    CopyBinary,
    ReadTemplate,
    WriteConfig,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	let step = match self {
	    Step::CopyBinary => "copy CNI plugin binary",
	    Step::ReadTemplate => "read CNI plugin conf template",
	    Step::WriteConfig => "write CNI plugin conf",
	};
	f.write_str(step)
    }
}

#[derive(Error, Debug)]
pub enum Error {

    #[error("invalid command line: {0}")]
    InvalidArguments(#[source] clap::Error),

    #[error("missing required option, please set env var {0}")]
    ConfigurationMissing(&'static str),

    #[error("invalid value {value:?} for env var {key}, expected one of: {expected}")]
    ConfigurationInvalid {
	key: &'static str,
	value: String,
	expected: &'static str,
    },

    /* no in-cluster config, no usable kubeconfig, or the client could not be built */
    #[error("failure connecting to the k8s control plane: {0}")]
    ClusterUnavailable(#[source] kube::Error),

    #[error("failed to get node {node}: {source}")]
    NodeLookupFailed {
	node: String,
	source: kube::Error,
    },

    #[error("node {node} is not registered in the cluster")]
    NodeNotFound {
	node: String,
    },

    #[error("missing pod CIDR for node {node}")]
    MissingPodCidr {
	node: String,
    },

    #[error("detected multiple pod CIDRs {cidrs:?} in node {node}, this is not implemented")]
    MultipleCidrsUnsupported {
	node: String,
	cidrs: Vec<String>,
    },

    #[error("failure to {step}: {source}")]
    Install {
	step: Step,
	source: sknf_artifacts::Error,
    },

    #[error("unable to register shutdown signals: {0}")]
    SignalRegistration(#[source] io::Error),

    #[error("`{0}`")]
    Other(String),
}
