use std::{io, path::PathBuf, process, time::Duration};

use clap::Parser;
use color_eyre as ey;
use ey::eyre::Context;
use sjbuild::{BuildConfig, BuildOrchestrator, CompilerInvoker};
use sjbuild_shared::log::{self, info};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
enum CommandLineArguments {
    Build(Build),
}

#[derive(Parser, Debug)]
struct Build {
    /// Path to the build config file
    #[arg(short, long)]
    config_filepath: PathBuf,

    /// Kill a compiler that runs longer than this many seconds
    #[arg(short, long)]
    timeout_secs: Option<u64>,
}

fn main() -> ey::Result<()> {
    // Setup logging
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}[{}][{}] {}",
                sjbuild_shared::chrono::Local::now().format("[%Y-%m-%d][%H:%M:%S]"),
                record.target(),
                record.level(),
                message
            ))
        })
        .level(log::LevelFilter::Trace)
        .chain(io::stdout())
        .apply()
        .map_err(|err| io::Error::new(io::ErrorKind::Other, err))?;

    let command_line_arguments = CommandLineArguments::parse();
    match &command_line_arguments {
        CommandLineArguments::Build(build) => {
            info!("Reading build config: {:?}", build.config_filepath);
            let config = BuildConfig::from_yaml_file(&build.config_filepath).wrap_err("Failed to read the build config")?;
            config.create_output_dirs().wrap_err("Failed to create the data directories")?;

            let mut orchestrator = BuildOrchestrator::from_config(&config);
            if let Some(timeout_secs) = build.timeout_secs {
                let invoker = CompilerInvoker::new().with_timeout(Duration::from_secs(timeout_secs));
                orchestrator = orchestrator.with_invoker(invoker);
            }

            let result = orchestrator.run();
            if !result.all_succeeded {
                process::exit(1);
            }
        }
    }
    Ok(())
}
