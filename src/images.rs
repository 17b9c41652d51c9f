use crate::errors::Error;
use eyre::{eyre, WrapErr};
use std::{fmt, path::Path};

/// Maps the name of the directory holding a Dockerfile to the name of the image it builds
const IMAGE_NAMES: &[(&str, &str)] = &[
    ("zanata-server", "server"),
    ("fedora-package", "fedora-package"),
    ("centos-repo-builder", "centos-repo-builder"),
];

/// Look up the image name for a directory name
pub fn image_name_for(directory: &str) -> Option<&'static str> {
    IMAGE_NAMES
        .iter()
        .find(|(name, _)| *name == directory)
        .map(|(_, image)| *image)
}

/// Determine the image name for a Dockerfile directory
///
/// An explicit name always wins over the lookup table. Directories missing from the table are
/// rejected rather than guessed at.
pub fn resolve_name(directory: &Path, explicit: Option<&str>) -> Result<String, Error> {
    if let Some(name) = explicit {
        return Ok(name.to_owned());
    }

    let canonical = directory
        .canonicalize()
        .wrap_err_with(|| format!("failed to resolve {}", directory.display()))
        .map_err(Error::Unspecified)?;
    let base = canonical
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| {
            Error::Fatal(eyre!(
                "could not determine directory name of {}",
                canonical.display()
            ))
        })?;

    image_name_for(base)
        .map(str::to_owned)
        .ok_or_else(|| Error::UnknownModule(base.to_owned()))
}

/// A reference to an image, without a tag
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ImageRef {
    registry: String,
    repository: String,
    name: String,
}

impl ImageRef {
    pub fn new(
        registry: impl Into<String>,
        repository: impl Into<String>,
        name: impl Into<String>,
    ) -> ImageRef {
        ImageRef {
            registry: registry.into(),
            repository: repository.into(),
            name: name.into(),
        }
    }

    pub fn repository(&self) -> &str {
        &self.repository
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The local reference, `<repository>/<name>:<tag>`
    pub fn local(&self, tag: &str) -> String {
        format!("{}/{}:{tag}", self.repository, self.name)
    }

    /// The reference qualified with the push registry, `<registry>/<repository>/<name>:<tag>`
    pub fn qualified(&self, tag: &str) -> String {
        format!("{}/{}/{}:{tag}", self.registry, self.repository, self.name)
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.registry, self.repository, self.name)
    }
}
