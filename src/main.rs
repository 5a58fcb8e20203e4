use clap::Parser;
use kennel_genetics::{cli, commands, config::Config};
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = cli::Args::parse();
    let config = Config::load();

    let result = match args.command {
        cli::Commands::Analyze {
            data_file,
            sire,
            dam,
            output_file,
            scoring_mode,
            generations,
        } => commands::analyze::run(&config, data_file, sire, dam, output_file, scoring_mode, generations),
        cli::Commands::Suggest {
            data_file,
            dog,
            gender,
            limit,
            output_file,
        } => commands::suggest::run(&config, data_file, dog, gender, limit, output_file),
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
