use clap::Parser;
use tracing_subscriber::EnvFilter;

use fintrack::cli::{self, CategoriesCommands, Cli, Commands, ReportCommands};
use fintrack::settings::load_settings;

fn main() {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    let level = load_settings(config).log_level;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fintrack={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Init {
            data_dir,
            base_currency,
        } => cli::init::run(config, data_dir, base_currency),
        Commands::Report { command } => match command {
            ReportCommands::Net => cli::report::net(config),
            ReportCommands::Categories { view } => cli::report::categories(config, view),
        },
        Commands::Transactions { from_date, to_date } => {
            cli::transactions::run(config, from_date, to_date)
        }
        Commands::Edit { row, column, value } => cli::edit::run(config, row, &column, &value),
        Commands::Categorize { text } => cli::categories::categorize_text(config, &text),
        Commands::Categories { command } => match command {
            CategoriesCommands::List => cli::categories::list(config),
            CategoriesCommands::Add { name, keywords } => {
                cli::categories::add(config, &name, &keywords)
            }
            CategoriesCommands::Remove { name } => cli::categories::remove(config, &name),
            CategoriesCommands::AddKeyword { category, keywords } => {
                cli::categories::add_keywords(config, &category, &keywords)
            }
            CategoriesCommands::RemoveKeyword { category, keyword } => {
                cli::categories::remove_keyword(config, &category, &keyword)
            }
        },
        Commands::Export { output_dir } => cli::export::run(config, output_dir),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
