use clap::Parser;
use twofactor::cli::{commands, output, Cli, Commands};
use twofactor::codec::GpgCodec;
use twofactor::errors::Result;
use twofactor::vault::VaultSession;

/// Environment variable holding the log filter (e.g. `debug`).
const LOG_ENV: &str = "TWOFACTOR_LOG";

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().filter_or(LOG_ENV, "warn"))
        .format_timestamp(None)
        .init();

    if let Err(e) = run(cli) {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    // Built on demand so `completions` never reads the config file.
    let session = || -> Result<VaultSession<GpgCodec>> {
        let settings = twofactor::cli::load_settings(&cli)?;
        twofactor::cli::open_session(&cli, &settings)
    };

    match cli.command {
        Commands::Get { ref name } => {
            let code = commands::get::execute(&session()?, name)?;
            println!("{code}");
        }
        Commands::Add {
            ref name,
            ref secret,
            ref description,
            ref padding,
        } => {
            commands::add::execute(
                &session()?,
                name,
                secret,
                description.as_deref(),
                padding.as_deref(),
            )?;
            output::success(&format!("Added '{name}'"));
        }
        Commands::List => {
            print!("{}", commands::list::execute(&session()?)?);
        }
        Commands::Rename {
            ref name,
            ref newname,
        } => {
            commands::rename::execute(&session()?, name, newname)?;
            output::success(&format!("Renamed '{name}' to '{newname}'"));
        }
        Commands::SetDescription {
            ref name,
            ref description,
        } => {
            commands::set_description::execute(&session()?, name, description)?;
            output::success(&format!("Updated description of '{name}'"));
        }
        Commands::SetPadding {
            ref name,
            ref padding,
        } => {
            commands::set_padding::execute(&session()?, name, padding)?;
            output::success(&format!("'{name}' now uses {} digits", padding.trim()));
        }
        Commands::Completions { shell } => {
            commands::completions::execute(shell, &mut std::io::stdout())?;
        }
    }

    Ok(())
}
