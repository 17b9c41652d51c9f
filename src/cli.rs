use crate::errors::ExitStatus;
use clap::{error::ErrorKind, Parser};
use std::path::PathBuf;
use tracing::Level;
use url::Url;

mod parsers;

/// Parse the command line arguments
pub fn parse() -> Result<Args, clap::Error> {
    Args::try_parse()
}

/// The exit status for arguments that could not be parsed
///
/// Requests for help or the version are not failures, everything else is an invalid option.
pub fn exit_status(error: &clap::Error) -> ExitStatus {
    match error.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitStatus::Ok,
        _ => ExitStatus::InvalidOptions,
    }
}

/// Build, tag and optionally push a container image
///
/// The image is built once from DIRECTORY, which must contain a Dockerfile, then tagged as
/// <REGISTRY>/<REPOSITORY>/<IMAGE>:<TAG> for every requested tag. The image name comes from the
/// directory name (zanata-server => server, fedora-package, centos-repo-builder) unless
/// --image-name is given.
///
/// In release mode the registry is checked for the release tag first. If it already exists
/// nothing is done and the program exits with status 40. Otherwise the version marker in the
/// Dockerfile is set to the release version (the tag up to the first '-') and the change is
/// committed, but not pushed, before building.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Push the image to the registry after tagging
    #[arg(short, long)]
    pub push: bool,

    /// Tag to apply to the image, can be repeated
    ///
    /// Defaults to `latest` when no tags are given.
    #[arg(short, long = "tag", value_name = "TAG", value_parser = parsers::tag())]
    pub tags: Vec<String>,

    /// Make a release with the given tag, i.e. 4.3.0-1
    ///
    /// Implies `--push` and the tags `latest` and TAG.
    #[arg(short, long, value_name = "TAG", value_parser = parsers::tag())]
    pub release: Option<String>,

    /// The directory containing the Dockerfile
    #[arg(value_parser = parsers::directory())]
    pub directory: PathBuf,

    /// The registry host to push to
    #[arg(
        long,
        default_value = "docker.io",
        env = "DOCKER_PUSH_REGISTRY",
        value_parser = parsers::string(),
    )]
    pub registry: String,
    /// The repository (namespace) the images belong to
    #[arg(
        long,
        default_value = "zanata",
        env = "DOCKER_REPOSITORY",
        value_parser = parsers::string(),
    )]
    pub repository: String,
    /// Use this image name instead of deriving it from the directory name
    #[arg(long, env = "IMAGE_MAKE_IMAGE_NAME", value_parser = parsers::string())]
    pub image_name: Option<String>,
    /// The Dockerfile `ARG` holding the version, rewritten in release mode
    #[arg(
        long,
        default_value = "ZANATA_VERSION",
        env = "VERSION_ARG",
        value_parser = parsers::string(),
    )]
    pub version_arg: String,
    /// The base URL of the registry API used to look up existing tags
    #[arg(long, default_value = "https://hub.docker.com/", env = "REGISTRY_API_URL")]
    pub registry_api: Url,

    /// The container CLI to build, tag and push with
    #[arg(
        long,
        default_value = "docker",
        env = "DOCKER",
        value_parser = parsers::string(),
    )]
    pub docker: String,
    /// The git executable
    #[arg(long, default_value = "git", env = "GIT", value_parser = parsers::string())]
    pub git: String,

    /// The default level to log at
    ///
    /// Overridden by the `RUST_LOG` environment variable.
    #[arg(long, default_value_t = Level::INFO, env = "LOG_LEVEL")]
    pub log_level: Level,
}

impl Args {
    /// Whether images should be pushed, always true for releases
    pub fn should_push(&self) -> bool {
        self.push || self.release.is_some()
    }
}
