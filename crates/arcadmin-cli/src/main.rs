mod args;
mod cmd;
mod output;

use arcadmin_core::config::OutputFormat;
use arcadmin_core::{Fault, Narrator};
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use cmd::{
    create_service::CreateServiceArgs, manage_service::ManageServiceArgs,
    manage_site::ManageSiteArgs,
};

#[derive(Parser)]
#[command(
    name = "arcadmin",
    about = "Administer ArcGIS Server sites: publish services and manage clusters and machines",
    version,
    propagate_version = true
)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload service definition files and publish them as services
    CreateService(CreateServiceArgs),

    /// Start, stop, delete or inspect a published service (not implemented)
    ManageService(ManageServiceArgs),

    /// Create and delete clusters, move machines between them, and list both
    ManageSite(ManageSiteArgs),
}

fn main() {
    let mut command = Cli::command();
    command.build();
    let argv = args::expand_legacy_flags(std::env::args_os());
    let argv = args::gather_create_service_files(argv, &command);
    let matches = command.get_matches_from(argv);
    let cli = Cli::from_arg_matches(&matches)
        .map_err(|e| e.format(&mut Cli::command()))
        .unwrap_or_else(|e| e.exit());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let narrator = Narrator::stderr();

    let result = match cli.command {
        Commands::CreateService(args) => cmd::create_service::run(&narrator, args, format),
        Commands::ManageService(args) => cmd::manage_service::run(&narrator, args),
        Commands::ManageSite(args) => cmd::manage_site::run(&narrator, args, format),
    };

    if let Err(e) = result {
        // A narrated fault has already printed its `Error <action>: ...` line.
        let code = match e.downcast_ref::<Fault>() {
            Some(fault) if fault.is_reported() => fault.exit_code(),
            _ => {
                eprintln!("error: {e:#}");
                1
            }
        };
        std::process::exit(code);
    }
}
