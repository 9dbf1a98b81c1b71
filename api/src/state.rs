use std::fmt;

/*
 * The installer runs once, front to back:
 *
 *   starting -> configuring -> resolving-cidr -> installing -> ready -> shutting-down -> stopped
 *
 * A failure while configuring, resolving or installing jumps straight to
 * stopped.
 */
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DaemonState {
    /*
     * process is up, signal handlers are being registered
     */
    Starting,

    /*
     * merging environment and command line with the defaults
     */
    Configuring,

    /*
     * asking the control plane (or the override) for our pod CIDR
     */
    ResolvingCidr,

    /*
     * writing the plugin binary and its configuration to the host
     */
    Installing,

    /*
     * everything is in place, we only hold the process open
     */
    Ready,

    /*
     * a termination signal has arrived
     */
    ShuttingDown,

    Stopped,
}

impl DaemonState {

    /*
     * Whether the state may legally follow this one.  Failure is the only
     * shortcut, from configuring/resolving/installing to stopped.
     */
    pub fn can_transition_to(&self, next: DaemonState) -> bool {
	use DaemonState::*;

	match (self, next) {
	    (Starting, Configuring) => true,
	    (Configuring, ResolvingCidr) => true,
	    (ResolvingCidr, Installing) => true,
	    (Installing, Ready) => true,
	    (Ready, ShuttingDown) => true,
	    (ShuttingDown, Stopped) => true,
	    (Configuring | ResolvingCidr | Installing, Stopped) => true,
	    _ => false,
	}
    }
}

impl fmt::Display for DaemonState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	let name = match self {
	    DaemonState::Starting => "starting",
	    DaemonState::Configuring => "configuring",
	    DaemonState::ResolvingCidr => "resolving-cidr",
	    DaemonState::Installing => "installing",
	    DaemonState::Ready => "ready",
	    DaemonState::ShuttingDown => "shutting-down",
	    DaemonState::Stopped => "stopped",
	};
	f.write_str(name)
    }
}
