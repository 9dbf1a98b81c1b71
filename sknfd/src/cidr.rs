use crate::errors::Error;

use k8s_openapi::api::core::v1::Node as KubeNode;
use kube::Api as KubeApi;
use kube::Client as KubeClient;
use log;
use sknf_api::NodeNetworkSpec;
use std::future::Future;

#[derive(Debug)]
pub enum LookupError {
    NotFound,
    Transport(kube::Error),
}

/*
 * Anything able to tell us how a node's network is configured.
 */
pub trait NodeLookup {
    fn lookup(&self, node: &str) -> impl Future<Output = Result<NodeNetworkSpec, LookupError>>;
}

/*
 * KubeNodeLookup reads Node objects from the control plane; this needs
 * `get` on `nodes` (cluster scoped) for the pod's service account.
 */
#[derive(Clone)]
pub struct KubeNodeLookup {
    node_api: KubeApi<KubeNode>,
}

impl KubeNodeLookup {

    pub fn new(kube_client: KubeClient) -> Self {
	Self{
	    node_api: KubeApi::all(kube_client),
	}
    }

    /*
     * Connects with the in-cluster configuration when running in a pod,
     * falling back to the local kubeconfig.
     */
    pub async fn connect() -> Result<Self, Error> {
	let kube_client = KubeClient::try_default().await.map_err(Error::ClusterUnavailable)?;
	Ok(Self::new(kube_client))
    }
}

impl NodeLookup for KubeNodeLookup {

    async fn lookup(&self, node: &str) -> Result<NodeNetworkSpec, LookupError> {
	match self.node_api.get_opt(node).await {
	    Ok(Some(found)) => Ok(NodeNetworkSpec::from(&found)),
	    Ok(None) => Err(LookupError::NotFound),
	    Err(err) => Err(LookupError::Transport(err)),
	}
    }
}

/*
 * Picks the one CIDR we install for a node:
 *
 *  1. .spec.podCIDR, whenever it is set
 *  2. the only entry of .spec.podCIDRs
 *
 * Dual-stack nodes (more than one entry in .spec.podCIDRs) are refused.
 */
pub fn pod_cidr(spec: &NodeNetworkSpec, node: &str) -> Result<String, Error> {
    if !spec.pod_cidr.is_empty() {
	return Ok(spec.pod_cidr.clone());
    }

    match spec.pod_cidrs.as_slice() {
	[] => Err(Error::MissingPodCidr{ node: node.to_string() }),
	[cidr] => Ok(cidr.clone()),
	cidrs => {
	    // TODO: pick one CIDR per IP family once the plugin handles dual-stack
	    Err(Error::MultipleCidrsUnsupported{ node: node.to_string(), cidrs: cidrs.to_vec() })
	},
    }
}

pub enum CidrResolver<L = KubeNodeLookup> {
    /* ask the lookup for the node, then apply pod_cidr() */
    Live(L),

    /* standalone: the configured CIDR, no lookup at all */
    Override(String),
}

impl<L: NodeLookup> CidrResolver<L> {

    pub async fn resolve(&self, node: &str) -> Result<String, Error> {
	let lookup = match self {
	    CidrResolver::Override(cidr) => {
		log::debug!("Using pod CIDR override {} for node {}", cidr, node);
		return Ok(cidr.clone());
	    },
	    CidrResolver::Live(lookup) => lookup,
	};

	let spec = match lookup.lookup(node).await {
	    Ok(spec) => spec,
	    Err(LookupError::NotFound) => return Err(Error::NodeNotFound{ node: node.to_string() }),
	    Err(LookupError::Transport(source)) => {
		return Err(Error::NodeLookupFailed{ node: node.to_string(), source });
	    },
	};
	log::debug!("Node {} reports {:?}", node, spec);

	pod_cidr(&spec, node)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use kube::error::ErrorResponse;
    use std::collections::BTreeMap;
    use std::sync::Mutex;

    /*
     * An in-memory control plane; nodes missing from the map are not found,
     * a broken one fails every request.
     */
    #[derive(Default)]
    pub(crate) struct FakeNodes {
	pub nodes: BTreeMap<String, NodeNetworkSpec>,
	pub broken: bool,
	pub requests: Mutex<Vec<String>>,
    }

    impl FakeNodes {
	pub(crate) fn with(node: &str, spec: NodeNetworkSpec) -> Self {
	    let mut nodes = BTreeMap::new();
	    nodes.insert(node.to_string(), spec);
	    Self{ nodes, ..Default::default() }
	}
    }

    impl NodeLookup for FakeNodes {
	async fn lookup(&self, node: &str) -> Result<NodeNetworkSpec, LookupError> {
	    self.requests.lock().unwrap().push(node.to_string());

	    if self.broken {
		return Err(LookupError::Transport(kube::Error::Api(ErrorResponse{
		    status: String::from("Failure"),
		    message: String::from("nodes \"worker-1\" is forbidden"),
		    reason: String::from("Forbidden"),
		    code: 403,
		})));
	    }
	    self.nodes.get(node).cloned().ok_or(LookupError::NotFound)
	}
    }

    #[test]
    fn test_legacy_field_wins() {
	let cases = [
	    NodeNetworkSpec::new("10.244.3.0/24", &[]),
	    NodeNetworkSpec::new("10.244.3.0/24", &["10.244.9.0/24"]),
	    NodeNetworkSpec::new("10.244.3.0/24", &["10.244.3.0/24", "fd00::/64"]),
	];

	for spec in cases {
	    assert_eq!(pod_cidr(&spec, "worker-1").unwrap(), "10.244.3.0/24");
	}
    }

    #[test]
    fn test_single_entry_list() {
	let spec = NodeNetworkSpec::new("", &["fd00:10:244::/64"]);
	assert_eq!(pod_cidr(&spec, "worker-1").unwrap(), "fd00:10:244::/64");
    }

    #[test]
    fn test_multiple_entries_are_refused() {
	let spec = NodeNetworkSpec::new("", &["10.1.0.0/24", "fd00::/64"]);

	match pod_cidr(&spec, "worker-1") {
	    Err(Error::MultipleCidrsUnsupported{ node, cidrs }) => {
		assert_eq!(node, "worker-1");
		assert_eq!(cidrs, vec!["10.1.0.0/24", "fd00::/64"]);
	    },
	    other => panic!("expected MultipleCidrsUnsupported, got {:?}", other),
	}

	let spec = NodeNetworkSpec::new("", &["10.1.0.0/24", "10.2.0.0/24", "10.3.0.0/24"]);
	assert!(matches!(pod_cidr(&spec, "worker-1"), Err(Error::MultipleCidrsUnsupported{ .. })));
    }

    #[test]
    fn test_no_cidr_at_all() {
	match pod_cidr(&NodeNetworkSpec::default(), "worker-1") {
	    Err(Error::MissingPodCidr{ node }) => assert_eq!(node, "worker-1"),
	    other => panic!("expected MissingPodCidr, got {:?}", other),
	}
    }

    #[tokio::test]
    async fn test_live_resolution() {
	let resolver = CidrResolver::Live(FakeNodes::with("worker-1", NodeNetworkSpec::new("", &["10.244.1.0/24"])));
	assert_eq!(resolver.resolve("worker-1").await.unwrap(), "10.244.1.0/24");
    }

    #[tokio::test]
    async fn test_live_node_not_found() {
	let resolver = CidrResolver::Live(FakeNodes::default());

	match resolver.resolve("ghost").await {
	    Err(Error::NodeNotFound{ node }) => assert_eq!(node, "ghost"),
	    other => panic!("expected NodeNotFound, got {:?}", other),
	}
    }

    #[tokio::test]
    async fn test_live_transport_failure_keeps_cause() {
	let resolver = CidrResolver::Live(FakeNodes{ broken: true, ..Default::default() });

	match resolver.resolve("worker-1").await {
	    Err(Error::NodeLookupFailed{ node, source: kube::Error::Api(resp) }) => {
		assert_eq!(node, "worker-1");
		assert_eq!(resp.code, 403);
	    },
	    other => panic!("expected NodeLookupFailed, got {:?}", other),
	}
    }

    #[tokio::test]
    async fn test_override_skips_lookup() {
	let resolver: CidrResolver<FakeNodes> = CidrResolver::Override(String::from("10.9.0.0/24"));
	assert_eq!(resolver.resolve("unregistered").await.unwrap(), "10.9.0.0/24");
    }

    #[tokio::test]
    async fn test_live_asks_for_the_configured_node() {
	let fake = FakeNodes::with("worker-1", NodeNetworkSpec::new("10.244.1.0/24", &[]));
	let resolver = CidrResolver::Live(fake);
	resolver.resolve("worker-1").await.unwrap();

	if let CidrResolver::Live(fake) = &resolver {
	    assert_eq!(*fake.requests.lock().unwrap(), vec!["worker-1"]);
	}
    }
}
