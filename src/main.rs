use clap::Parser;
use locator_healing::cli::commands::{cmd_inspect, cmd_run};
use locator_healing::cli::config::{Cli, Commands, load_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    // Resolve embedding settings: CLI > config > defaults
    let embed_endpoint = cli
        .embed_endpoint
        .as_deref()
        .or(config.embedding.endpoint.as_deref());
    let embed_model = cli
        .embed_model
        .as_deref()
        .or(config.embedding.model.as_deref());

    match cli.command {
        Commands::Run {
            ref mapping,
            ref screenshots_dir,
            ref output,
            ref format,
            retry_attempts,
            step_timeout_ms,
            settle_ms,
            ref policy,
            ref embedder,
            ref trace,
            persist,
        } => {
            let success = cmd_run(
                mapping,
                screenshots_dir.as_deref(),
                output.as_deref(),
                format,
                retry_attempts,
                step_timeout_ms,
                settle_ms,
                policy.as_deref(),
                embedder.as_deref(),
                trace.as_deref(),
                persist,
                &config,
                cli.verbose,
                embed_endpoint,
                embed_model,
            )?;
            if !success {
                std::process::exit(1);
            }
        }
        Commands::Inspect { ref mapping } => {
            cmd_inspect(mapping)?;
        }
    }

    Ok(())
}
