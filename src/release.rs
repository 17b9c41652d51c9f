use crate::{
    errors::Error,
    exec::Runner,
    images::ImageRef,
    registry::TagLookup,
    tags::Release,
};
use eyre::{eyre, WrapErr};
use std::{fs, path::Path, process::Command};
use tracing::{info, instrument, warn};

/// Whether a release should go ahead
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ReleaseOutcome {
    /// The Dockerfile was updated and committed
    Proceed,
    /// The release tag already exists in the registry, nothing was changed
    AlreadyReleased,
}

/// Everything needed to prepare a release
#[derive(Debug)]
pub struct Preparation<'a> {
    pub directory: &'a Path,
    pub image: &'a ImageRef,
    pub release: &'a Release,
    pub version_arg: &'a str,
    pub git: &'a str,
}

/// Prepare the release, stopping early if it was already published
///
/// The commit is only made locally. If committing fails, the Dockerfile is left modified.
#[instrument(
    name = "release",
    skip_all,
    fields(image = %preparation.image, tag = preparation.release.tag()),
)]
pub async fn prepare<L, R>(
    lookup: &L,
    runner: &mut R,
    preparation: Preparation<'_>,
) -> Result<ReleaseOutcome, Error>
where
    L: TagLookup + ?Sized,
    R: Runner,
{
    let Preparation {
        directory,
        image,
        release,
        version_arg,
        git,
    } = preparation;

    let exists = lookup
        .tag_exists(image.repository(), image.name(), release.tag())
        .await?;
    if exists {
        info!("tag already exists in the registry, skipping release");
        return Ok(ReleaseOutcome::AlreadyReleased);
    }

    let dockerfile = directory.join("Dockerfile");
    set_version(&dockerfile, version_arg, release.version())?;
    info!(version = release.version(), "updated version in Dockerfile");

    let message = format!(
        "chore(release): {}/{} {}",
        image.repository(),
        image.name(),
        release.tag()
    );
    let committed = runner.run_inherited(
        Command::new(git)
            .arg("-C")
            .arg(directory)
            .arg("commit")
            .arg("--all")
            .arg("--message")
            .arg(&message),
    );
    if let Err(error) = committed {
        warn!(
            dockerfile = %dockerfile.display(),
            "commit failed, the Dockerfile has been left modified"
        );
        return Err(error);
    }

    Ok(ReleaseOutcome::Proceed)
}

/// Rewrite the `ARG <name>=` lines of a Dockerfile to hold the version
pub fn set_version(dockerfile: &Path, name: &str, version: &str) -> Result<(), Error> {
    let contents = fs::read_to_string(dockerfile)
        .wrap_err_with(|| format!("failed to read {}", dockerfile.display()))
        .map_err(Error::Unspecified)?;

    let updated = replace_version(&contents, name, version).ok_or_else(|| {
        Error::Fatal(eyre!(
            "{} has no `ARG {name}=` line to update",
            dockerfile.display()
        ))
    })?;

    fs::write(dockerfile, updated)
        .wrap_err_with(|| format!("failed to write {}", dockerfile.display()))
        .map_err(Error::Unspecified)
}

/// Replace the value of every `ARG <name>=` line, returning `None` if there are none
fn replace_version(contents: &str, name: &str, version: &str) -> Option<String> {
    let prefix = format!("ARG {name}=");
    let mut found = false;

    let updated = contents
        .split_inclusive('\n')
        .map(|line| {
            let trimmed = line.trim_start();
            if !trimmed.starts_with(&prefix) {
                return line.to_owned();
            }

            found = true;
            let indent = &line[..line.len() - trimmed.len()];
            let ending = if line.ends_with("\r\n") {
                "\r\n"
            } else if line.ends_with('\n') {
                "\n"
            } else {
                ""
            };
            format!("{indent}{prefix}{version}{ending}")
        })
        .collect::<String>();

    found.then_some(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        errors::ExitStatus,
        exec::testing::RecordingRunner,
        registry::LookupError,
    };
    use async_trait::async_trait;
    use tempfile::TempDir;

    const DOCKERFILE: &str = "FROM jboss/wildfly:10.1.0.Final\n\
                              ARG ZANATA_VERSION=4.2.4\n\
                              RUN echo ${ZANATA_VERSION}\n";

    struct Registry {
        existing: Vec<&'static str>,
    }

    #[async_trait]
    impl TagLookup for Registry {
        async fn tag_exists(
            &self,
            _repository: &str,
            _image: &str,
            tag: &str,
        ) -> Result<bool, LookupError> {
            Ok(self.existing.iter().any(|existing| *existing == tag))
        }
    }

    fn project(contents: &str) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Dockerfile"), contents).unwrap();
        dir
    }

    async fn run_prepare(
        dir: &TempDir,
        existing: Vec<&'static str>,
        runner: &mut RecordingRunner,
    ) -> Result<ReleaseOutcome, Error> {
        let image = ImageRef::new("docker.io", "zanata", "server");
        let release = Release::new("4.3.0-1");
        let preparation = Preparation {
            directory: dir.path(),
            image: &image,
            release: &release,
            version_arg: "ZANATA_VERSION",
            git: "git",
        };

        prepare(&Registry { existing }, runner, preparation).await
    }

    fn dockerfile(dir: &TempDir) -> String {
        fs::read_to_string(dir.path().join("Dockerfile")).unwrap()
    }

    #[test]
    fn replaces_marker_line() {
        let updated = replace_version(DOCKERFILE, "ZANATA_VERSION", "4.3.0").unwrap();
        assert_eq!(
            updated,
            "FROM jboss/wildfly:10.1.0.Final\n\
             ARG ZANATA_VERSION=4.3.0\n\
             RUN echo ${ZANATA_VERSION}\n"
        );
    }

    #[test]
    fn keeps_indentation_and_line_endings() {
        let updated =
            replace_version("FROM x\r\n  ARG V=1\r\nARG V=2", "V", "3").unwrap();
        assert_eq!(updated, "FROM x\r\n  ARG V=3\r\nARG V=3");
    }

    #[test]
    fn ignores_similar_names() {
        let contents = "ARG ZANATA_VERSION_SUFFIX=x\n";
        assert_eq!(replace_version(contents, "ZANATA_VERSION", "4.3.0"), None);
    }

    #[test]
    fn missing_marker_is_fatal() {
        let dir = project("FROM scratch\n");
        let error = set_version(&dir.path().join("Dockerfile"), "ZANATA_VERSION", "4.3.0")
            .unwrap_err();

        assert_eq!(error.exit_status(), ExitStatus::FatalFail);
        assert_eq!(dockerfile(&dir), "FROM scratch\n");
    }

    #[tokio::test]
    async fn bumps_version_and_commits() {
        let dir = project(DOCKERFILE);
        let mut runner = RecordingRunner::default();

        let outcome = run_prepare(&dir, vec!["4.2.4-1"], &mut runner).await.unwrap();

        assert_eq!(outcome, ReleaseOutcome::Proceed);
        assert!(dockerfile(&dir).contains("ARG ZANATA_VERSION=4.3.0\n"));
        assert!(!dockerfile(&dir).contains("4.3.0-1"));

        let path = dir.path().to_string_lossy().into_owned();
        assert_eq!(
            runner.calls,
            [vec![
                "git",
                "-C",
                path.as_str(),
                "commit",
                "--all",
                "--message",
                "chore(release): zanata/server 4.3.0-1",
            ]]
        );
    }

    #[tokio::test]
    async fn already_released_changes_nothing() {
        let dir = project(DOCKERFILE);
        let mut runner = RecordingRunner::default();

        let outcome = run_prepare(&dir, vec!["4.3.0-1"], &mut runner).await.unwrap();

        assert_eq!(outcome, ReleaseOutcome::AlreadyReleased);
        assert_eq!(dockerfile(&dir), DOCKERFILE);
        assert!(runner.calls.is_empty());
    }

    #[tokio::test]
    async fn failed_commit_leaves_dockerfile_modified() {
        let dir = project(DOCKERFILE);
        let mut runner = RecordingRunner::failing_on("-C");

        let error = run_prepare(&dir, vec![], &mut runner).await.unwrap_err();

        assert_eq!(error.exit_status(), ExitStatus::ErrorFail);
        assert!(dockerfile(&dir).contains("ARG ZANATA_VERSION=4.3.0\n"));
    }
}
