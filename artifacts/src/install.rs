use crate::errors::Error;

use log;
use std::fs;
use std::io;
use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::path::PathBuf;

/// Mode of every configuration file we write.
pub const DEFAULT_CONFIG_MODE: u32 = 0o644;

/*
 * An Artifact is a single file that ends up on the host.  Installing it
 * either leaves the destination with the full content and mode, or fails
 * and leaves whatever was there before.
 */
pub trait Artifact {
    fn destination(&self) -> &Path;

    fn install(&self) -> Result<(), Error>;
}

/*
 * Staging is the file next to the destination where content is written
 * before being renamed over it.  Renaming also lets us replace a binary
 * that is currently being executed.
 *
 * A staging file that is dropped without commit() is removed.
 */
struct Staging {
    path: PathBuf,
    destination: PathBuf,
    file: Option<fs::File>,
}

impl Staging {

    fn create(destination: &Path) -> Result<Self, Error> {
	let name = match destination.file_name() {
	    Some(name) => name.to_string_lossy().into_owned(),
	    None => {
		let err = io::Error::new(io::ErrorKind::InvalidInput, "destination has no file name");
		return Err(Error::DestinationUnavailable{ path: destination.to_path_buf(), source: err });
	    }
	};
	let path = destination.with_file_name(format!(".{}.sknf-staging", name));

	let file = fs::OpenOptions::new()
	    .write(true)
	    .create(true)
	    .truncate(true)
	    .open(&path)
	    .map_err(|source| Error::DestinationUnavailable{ path: destination.to_path_buf(), source })?;

	Ok(Self{
	    path: path,
	    destination: destination.to_path_buf(),
	    file: Some(file),
	})
    }

    fn unavailable(&self, source: io::Error) -> Error {
	Error::DestinationUnavailable{ path: self.destination.clone(), source }
    }

    fn write(&mut self, content: &[u8]) -> Result<(), Error> {
	let result = match self.file.as_mut() {
	    Some(file) => file.write_all(content),
	    None => Ok(()),
	};
	result.map_err(|err| self.unavailable(err))
    }

    fn set_mode(&mut self, mode: u32) -> Result<(), Error> {
	let result = match self.file.as_ref() {
	    Some(file) => file.set_permissions(fs::Permissions::from_mode(mode)),
	    None => Ok(()),
	};
	result.map_err(|source| Error::PermissionSetFailed{ path: self.destination.clone(), mode, source })
    }

    fn commit(mut self) -> Result<(), Error> {
	if let Some(file) = self.file.take() {
	    file.sync_all().map_err(|err| self.unavailable(err))?;
	}

	fs::rename(&self.path, &self.destination).map_err(|err| self.unavailable(err))
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
	// commit() renamed it away already, nothing left to remove
	if self.file.is_none() && !self.path.exists() {
	    return;
	}

	if let Err(err) = fs::remove_file(&self.path) {
	    log::warn!("Unable to remove staging file {}: {}", self.path.display(), err);
	}
    }
}

fn install_content(destination: &Path, content: &[u8], mode: u32) -> Result<(), Error> {
    let mut staging = Staging::create(destination)?;

    staging.write(content)?;
    staging.set_mode(mode)?;
    staging.commit()
}

/*
 * Binary copies an executable from the container image onto the host.
 *
 * for example, the CNI plugin itself:
 *
 *   Binary::new("sknf-cni/bin/sknf-cni", "/host/opt/cni/bin/sknf-cni", 0o755)
 */
#[derive(Clone, Debug)]
pub struct Binary {
    source: PathBuf,
    destination: PathBuf,
    mode: u32,
}

impl Binary {

    pub fn new(source: impl AsRef<Path>, destination: impl AsRef<Path>, mode: u32) -> Self {
	Self{
	    source: source.as_ref().to_path_buf(),
	    destination: destination.as_ref().to_path_buf(),
	    mode: mode,
	}
    }

    pub fn source(&self) -> &Path {
	&self.source
    }

    pub fn mode(&self) -> u32 {
	self.mode
    }
}

impl Artifact for Binary {

    fn destination(&self) -> &Path {
	&self.destination
    }

    fn install(&self) -> Result<(), Error> {
	log::debug!("Copying {} to {} (mode {:o})", self.source.display(), self.destination.display(), self.mode);

	let content = fs::read(&self.source)
	    .map_err(|source| Error::SourceUnavailable{ path: self.source.clone(), source })?;

	install_content(&self.destination, &content, self.mode)?;
	log::debug!("Installed {} bytes at {}", content.len(), self.destination.display());

	Ok(())
    }
}

/*
 * ConfigFile writes already rendered content to the host, replacing
 * any previous file as a whole.
 */
#[derive(Clone, Debug)]
pub struct ConfigFile {
    content: String,
    destination: PathBuf,
}

impl ConfigFile {

    pub fn new(content: &str, destination: impl AsRef<Path>) -> Self {
	Self{
	    content: content.to_string(),
	    destination: destination.as_ref().to_path_buf(),
	}
    }

    pub fn content(&self) -> &str {
	&self.content
    }
}

impl Artifact for ConfigFile {

    fn destination(&self) -> &Path {
	&self.destination
    }

    fn install(&self) -> Result<(), Error> {
	log::debug!("Writing {} bytes to {}", self.content.len(), self.destination.display());

	install_content(&self.destination, self.content.as_bytes(), DEFAULT_CONFIG_MODE)
    }
}

pub fn read_to_string(path: impl AsRef<Path>) -> Result<String, Error> {
    let path = path.as_ref();

    fs::read_to_string(path).map_err(|source| Error::SourceUnavailable{ path: path.to_path_buf(), source })
}
