use errors::Error;
use eyre::WrapErr;
use std::{env, process};

mod cli;
mod errors;
mod exec;
mod images;
mod logging;
mod pipeline;
mod publish;
mod registry;
mod release;
mod tags;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    if let Err(error) = dotenvy::dotenv() {
        if !error.not_found() {
            return Err(error).wrap_err("invalid .env file");
        }
    }

    let args = match cli::parse() {
        Ok(args) => args,
        Err(error) => {
            error.print()?;
            process::exit(cli::exit_status(&error).code());
        }
    };

    let filter = env::var("RUST_LOG").ok();
    logging::init(args.log_level, filter.as_deref());

    let status = match run(args).await {
        Ok(outcome) => {
            if let pipeline::Outcome::Published(references) = &outcome {
                for reference in references {
                    println!("{reference}");
                }
            }

            outcome.exit_status()
        }
        Err(failure) => {
            let status = failure.exit_status();
            eprintln!("Error: {:?}", eyre::Report::new(failure));
            status
        }
    };

    process::exit(status.code());
}

/// Resolve the arguments into a plan and execute it
async fn run(args: cli::Args) -> Result<pipeline::Outcome, Error> {
    let push = args.should_push();
    let image_name = images::resolve_name(&args.directory, args.image_name.as_deref())?;
    let image = images::ImageRef::new(args.registry, args.repository, image_name);

    let release = args.release.map(tags::Release::new);
    let tags = tags::TagList::new(&args.tags, release.as_ref());

    let plan = pipeline::Plan {
        directory: args.directory,
        image,
        tags,
        release,
        push,
        build_args: publish::proxy_build_args(),
        version_arg: args.version_arg,
        docker: args.docker,
        git: args.git,
    };

    let hub = registry::DockerHub::new(args.registry_api)?;
    pipeline::run(&plan, &hub, &mut exec::SystemRunner).await
}
