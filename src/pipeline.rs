use crate::{
    errors::{Error, ExitStatus},
    exec::{self, Runner},
    images::ImageRef,
    publish::{self, Publication},
    registry::TagLookup,
    release::{self, Preparation, ReleaseOutcome},
    tags::{Release, TagList},
};
use std::path::PathBuf;
use tracing::{info, instrument};

/// A fully resolved run
#[derive(Debug)]
pub struct Plan {
    pub directory: PathBuf,
    pub image: ImageRef,
    pub tags: TagList,
    pub release: Option<Release>,
    pub push: bool,
    pub build_args: Vec<String>,
    pub version_arg: String,
    pub docker: String,
    pub git: String,
}

/// How a successful run ended
#[derive(Debug, Eq, PartialEq)]
pub enum Outcome {
    /// The image was built and tagged, and pushed if requested
    Published(Vec<String>),
    /// The release already exists, nothing was done
    AlreadyReleased,
}

impl Outcome {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Self::Published(_) => ExitStatus::Ok,
            Self::AlreadyReleased => ExitStatus::ReturnFalse,
        }
    }
}

/// Execute the plan, stopping at the first failure
#[instrument(name = "run", skip_all, fields(image = %plan.image))]
pub async fn run<L, R>(plan: &Plan, lookup: &L, runner: &mut R) -> Result<Outcome, Error>
where
    L: TagLookup + ?Sized,
    R: Runner,
{
    let mut programs = vec![plan.docker.as_str()];
    if plan.release.is_some() {
        programs.push(plan.git.as_str());
    }
    exec::verify_toolchain(runner, &programs)?;

    if let Some(release) = &plan.release {
        let preparation = Preparation {
            directory: &plan.directory,
            image: &plan.image,
            release,
            version_arg: &plan.version_arg,
            git: &plan.git,
        };

        match release::prepare(lookup, runner, preparation).await? {
            ReleaseOutcome::Proceed => {}
            ReleaseOutcome::AlreadyReleased => return Ok(Outcome::AlreadyReleased),
        }
    }

    let publication = Publication {
        directory: &plan.directory,
        image: &plan.image,
        tags: &plan.tags,
        build_args: &plan.build_args,
        push: plan.push,
    };
    let published = publish::publish(runner, &plan.docker, publication)?;
    info!(count = published.len(), pushed = plan.push, "done");

    Ok(Outcome::Published(published))
}
