use env_logger::Env;
use env_logger::Target;
use std::io::Write;

/// Tag prefixed to every diagnostic line.
pub const TAG: &str = "[sknf]";

/*
 * Diagnostics go to stderr as "[sknf] <level>: <message>", filtered by
 * RUST_LOG (info when unset).  Status milestones are printed on stdout by
 * the daemon itself.
 */
pub fn init() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
	.target(Target::Stderr)
	.format(|buf, record| writeln!(buf, "{} {}: {}", TAG, record.level(), record.args()))
	.init();
}
