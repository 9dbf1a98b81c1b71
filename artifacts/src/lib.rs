/*
 * sknf/artifacts - everything the installer leaves behind on the host: the
 * plugin binary, and the plugin configuration rendered from its template.
 */

pub mod errors;
pub use errors::Error;

pub mod install;
pub use install::Artifact;
pub use install::Binary;
pub use install::ConfigFile;
pub use install::read_to_string;

pub mod template;
pub use template::SUBNET_PLACEHOLDER;
