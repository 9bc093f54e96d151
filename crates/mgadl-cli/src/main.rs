use std::io;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use eyre::Result;
use tracing_subscriber::EnvFilter;

use mgadl_cli::config;
use mgadl_cli::terminal::{Terminal, TerminalOptions};
use mgadl_sheets::google::GoogleSheets;
use mgadl_sheets::memory::MemorySheets;
use mgadl_wizard::controller::Wizard;
use mgadl_wizard::session::Session;

#[derive(Parser)]
#[command(name = "mgadl")]
#[command(version)]
#[command(about = "MG-ADL questionnaire with spreadsheet tracking", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Secrets file (defaults to the platform config directory)
    #[arg(long, global = true)]
    secrets: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the questionnaire (default)
    Run {
        /// Write to an in-memory sheet instead of Google Sheets
        #[arg(long)]
        dry_run: bool,

        /// Directory CSV downloads are saved to
        #[arg(long, default_value = ".")]
        download_dir: PathBuf,
    },

    /// Show which integration settings are configured
    Status,

    /// Print the default secrets file location
    SecretsPath,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.log_json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init();
    }

    let command = cli.command.unwrap_or(Commands::Run {
        dry_run: false,
        download_dir: PathBuf::from("."),
    });

    match command {
        Commands::SecretsPath => {
            println!("{}", config::default_secrets_path()?.display());
            Ok(())
        }
        Commands::Status => {
            let cfg = config::load(cli.secrets.as_deref())?;
            let status = config::integration_status(&cfg);
            let mark = |ok: bool| if ok { "yes" } else { "missing" };
            println!("SHEET_ID configured:               {}", mark(status.sheet_id_configured));
            println!(
                "GOOGLE_SERVICE_ACCOUNT configured: {}",
                mark(status.service_account_configured)
            );
            println!("WORKSHEET_NAME:                    {}", status.worksheet_name);
            if let Some(email) = status.client_email {
                println!("service account:                   {email}");
                println!("(share the spreadsheet with this address as an editor)");
            }
            Ok(())
        }
        Commands::Run {
            dry_run,
            download_dir,
        } => {
            let cfg = config::load(cli.secrets.as_deref())?;
            let options = TerminalOptions { download_dir };
            let stdin = io::stdin().lock();
            let stdout = io::stdout().lock();
            let mut terminal = Terminal::new(stdin, stdout, options);
            let mut session = Session::new();

            if dry_run {
                tracing::info!("dry run: writing to an in-memory sheet");
                let backend = MemorySheets::new().with_spreadsheet(&cfg.sheet_id, "dry run");
                let wizard = Wizard::new(cfg.wizard_settings(), backend);
                terminal.run(&wizard, &mut session)
            } else {
                let backend = GoogleSheets::new(cfg.google_service_account.clone());
                let wizard = Wizard::new(cfg.wizard_settings(), backend);
                terminal.run(&wizard, &mut session)
            }
        }
    }
}
