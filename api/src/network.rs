use k8s_openapi::api::core::v1::Node;
use serde::{Deserialize, Serialize};

/*
 * NodeNetworkSpec carries the two pod CIDR representations a node may
 * report in its .spec:
 *
 *   spec:
 *     podCIDR: 10.244.3.0/24        # legacy, single family
 *     podCIDRs:                     # one entry per IP family
 *       - 10.244.3.0/24
 *
 * Absent fields are kept as empty values so the resolution policy only
 * needs to care about emptiness.
 */
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeNetworkSpec {

    #[serde(rename = "podCIDR", default)]
    pub pod_cidr: String,

    #[serde(rename = "podCIDRs", default)]
    pub pod_cidrs: Vec<String>,
}

impl NodeNetworkSpec {

    pub fn new(pod_cidr: &str, pod_cidrs: &[&str]) -> Self {
	Self{
	    pod_cidr: pod_cidr.to_string(),
	    pod_cidrs: pod_cidrs.iter().map(|cidr| cidr.to_string()).collect(),
	}
    }
}

impl From<&Node> for NodeNetworkSpec {

    fn from(node: &Node) -> Self {
	let spec = match &node.spec {
	    Some(spec) => spec,
	    None => return Self::default(),
	};

	Self{
	    pod_cidr: spec.pod_cidr.clone().unwrap_or_default(),
	    pod_cidrs: spec.pod_cidrs.clone().unwrap_or_default(),
	}
    }
}
