use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {

    #[error("cannot read {}: {source}", .path.display())]
    SourceUnavailable {
	path: PathBuf,
	source: io::Error,
    },

    #[error("cannot write {}: {source}", .path.display())]
    DestinationUnavailable {
	path: PathBuf,
	source: io::Error,
    },

    /* content is already staged when this happens, but never committed */
    #[error("cannot set mode {mode:o} on {}: {source}", .path.display())]
    PermissionSetFailed {
	path: PathBuf,
	mode: u32,
	source: io::Error,
    },
}
