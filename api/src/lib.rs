/*
 * sknf/api - the objects shared across the sknf installer: the subset of
 * a node's network configuration we care about and the installer's
 * lifecycle states.
 */

pub mod network;
pub use network::NodeNetworkSpec;

pub mod state;
pub use state::DaemonState;
