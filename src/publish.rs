use crate::{errors::Error, exec::Runner, images::ImageRef, tags::TagList};
use itertools::Itertools;
use std::{env, iter, path::Path, process::Command};
use tracing::{info, instrument};

/// Proxy variables forwarded to the build
const PROXY_VARIABLES: &[&str] = &[
    "http_proxy",
    "https_proxy",
    "ftp_proxy",
    "no_proxy",
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "FTP_PROXY",
    "NO_PROXY",
];

/// Collect the proxy settings from the environment as `NAME=value` build arguments
pub fn proxy_build_args() -> Vec<String> {
    PROXY_VARIABLES
        .iter()
        .filter_map(|name| {
            env::var(name)
                .ok()
                .map(|value| format!("{name}={value}"))
        })
        .collect()
}

/// What to build and where to publish it
#[derive(Debug)]
pub struct Publication<'a> {
    pub directory: &'a Path,
    pub image: &'a ImageRef,
    pub tags: &'a TagList,
    pub build_args: &'a [String],
    pub push: bool,
}

/// Build the image once, then tag and optionally push it for every tag
///
/// Returns the qualified references that were produced.
#[instrument(name = "publish", skip_all, fields(image = %publication.image, push = publication.push))]
pub fn publish<R: Runner>(
    runner: &mut R,
    docker: &str,
    publication: Publication<'_>,
) -> Result<Vec<String>, Error> {
    let Publication {
        directory,
        image,
        tags,
        build_args,
        push,
    } = publication;

    let built = image.local(tags.primary());
    build(runner, docker, directory, &built, build_args)?;
    info!(image = %built, "built image");

    let mut published = Vec::new();
    for tag in tags {
        let target = image.qualified(tag);

        runner.run_inherited(Command::new(docker).arg("tag").arg(&built).arg(&target))?;
        info!(%target, "tagged image");

        if push {
            runner.run_inherited(Command::new(docker).arg("push").arg(&target))?;
            info!(%target, "pushed image");
        }

        published.push(target);
    }

    Ok(published)
}

fn build<R: Runner>(
    runner: &mut R,
    docker: &str,
    directory: &Path,
    tag: &str,
    build_args: &[String],
) -> Result<(), Error> {
    let arg_count = build_args.len() * 2;
    runner.run_inherited(
        Command::new(docker)
            .arg("build")
            .arg("--tag")
            .arg(tag)
            .args(
                iter::repeat(&String::from("--build-arg"))
                    .interleave_shortest(build_args)
                    .take(arg_count),
            )
            .arg(directory),
    )
}
