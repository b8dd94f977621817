use clap::Parser;
use filevault::cli::{commands, Cli, Commands};
use filevault::config::Settings;

fn main() {
    let cli = Cli::parse();

    // Settings come from the working directory; a broken config file is fatal.
    let settings = match std::env::current_dir()
        .map_err(filevault::errors::VaultError::from)
        .and_then(|cwd| Settings::load(&cwd))
    {
        Ok(s) => s,
        Err(e) => {
            filevault::cli::output::error(&e.to_string());
            std::process::exit(1);
        }
    };

    filevault::logging::init(&settings.log_level);

    let result = match cli.command {
        Commands::Create { ref vault } => commands::create::execute(vault),
        Commands::Add {
            ref vault,
            ref files,
            delete_original,
        } => commands::add::execute(vault, files, delete_original, &settings),
        Commands::List { ref vault, json } => commands::list::execute(vault, json),
        Commands::Extract {
            ref vault,
            index,
            ref out,
        } => commands::extract::execute(vault, index, out.as_deref(), &settings),
        Commands::Remove {
            ref vault,
            index,
            force,
        } => commands::remove::execute(vault, index, force, &settings),
        Commands::Verify { ref vault, files } => commands::verify::execute(vault, files),
        Commands::Completions { shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        filevault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
