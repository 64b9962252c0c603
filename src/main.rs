use aigw_control_plane::cli::{handle_completions, handle_run, handle_validate_config, Cli, Commands};
use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run(args) => handle_run(&args).await,
        Commands::ValidateConfig(args) => handle_validate_config(&args),
        Commands::Completions(args) => {
            handle_completions(&args);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
