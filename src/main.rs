//! Module Creator - start-module
//!
//! Command-line entry point: creates new modules, adds apps to existing
//! modules, and lists the modules in an area.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use dialoguer::Confirm;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use module_creator::area::Area;
use module_creator::config::Config;
use module_creator::creator::ModuleCreator;
use module_creator::gateway::list_area_modules;
use module_creator::module::CreationRequest;
use module_creator::utils::{get_theme, print_error, print_success, print_warning};

/// Command-line arguments for start-module
#[derive(Parser)]
#[command(name = "start-module")]
#[command(about = "Create new modules and apps in the shared repository host", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file to use instead of the discovered one
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new module and push it to the host
    New(CreateArgs),

    /// Add an app to an existing module on the host
    AddApp {
        #[command(flatten)]
        create: CreateArgs,

        /// Name of the app; the module gains an `<APP_NAME>App` folder
        #[arg(long)]
        app_name: String,
    },

    /// List the modules in an area
    List {
        #[arg(short, long, default_value = "support")]
        area: Area,
    },
}

#[derive(Args)]
struct CreateArgs {
    /// Module path relative to the area, e.g. `motor` or `BL01I/MO`
    module_path: String,

    #[arg(short, long, default_value = "support")]
    area: Area,

    /// Create the module locally without pushing it
    #[arg(long)]
    no_push: bool,

    /// Push without asking for confirmation
    #[arg(short, long)]
    yes: bool,

    /// Extra template parameter
    #[arg(short = 'p', long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    params: Vec<(String, String)>,
}

fn parse_param(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_error(&format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let working_dir = env::current_dir()?;
    let config = Config::load(cli.config.as_deref(), &working_dir)?;

    match cli.command {
        Command::New(args) => create(&config, &args, None),
        Command::AddApp { create: args, app_name } => create(&config, &args, Some(&app_name)),
        Command::List { area } => {
            let gateway = config.gateway()?;
            for module in list_area_modules(gateway.as_ref(), &config.server.root_dir, area)? {
                println!("{module}");
            }
            Ok(())
        }
    }
}

fn create(config: &Config, args: &CreateArgs, app_name: Option<&str>) -> Result<()> {
    let mut request = CreationRequest::new(args.module_path.as_str(), args.area);
    for (key, value) in &args.params {
        request = request.with_param(key.as_str(), value.as_str());
    }

    let content = Box::new(config.template_content(args.area, app_name.is_some())?);
    let mut creator = match app_name {
        Some(name) => {
            let request = request.with_app_name(name);
            ModuleCreator::add_app(&request, config, config.gateway()?, content)?
        }
        None => ModuleCreator::new_module(&request, config, config.gateway()?, content)?,
    };

    creator.verify_remote_repo()?;
    creator.verify_can_create_local_module()?;
    creator.create_local_module()?;
    print_success(&format!(
        "Created {} in {}",
        creator.identity().module_path(),
        creator.identity().abs_path().display()
    ));

    if args.no_push {
        print_warning("Not pushed; the module exists only locally");
    } else if args.yes || confirm_push(creator.identity().remote_path())? {
        creator.push_repo_to_remote()?;
        print_success(&format!("Pushed to {}", creator.identity().remote_path()));
    } else {
        print_warning("Push cancelled; the module exists only locally");
    }

    creator.print_message();
    Ok(())
}

fn confirm_push(remote_path: &str) -> Result<bool> {
    Ok(Confirm::with_theme(&get_theme())
        .with_prompt(format!("Push to {remote_path}?"))
        .default(true)
        .interact()?)
}
