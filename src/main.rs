use std::process;

use anyhow::Result;
use log::{error, info};

use uiplugin_resolver::display::ColourManager;
use uiplugin_resolver::monitoring::ResolveError;
use uiplugin_resolver::{app, cli, logging};

fn main() {
    if let Err(e) = run() {
        if let Some(resolve_error) = e.downcast_ref::<ResolveError>() {
            report_resolve_error(resolve_error);
        } else {
            error!("Application error: {:#}", e);
            eprintln!("Error: {:#}", e);
        }
        process::exit(1);
    }
}

/// The user's UIPlugin is at fault, report it without log noise
fn report_resolve_error(resolve_error: &ResolveError) {
    let no_color_flag = std::env::args().any(|arg| arg == "--no-color");
    let colours = ColourManager::from_flags(no_color_flag);
    eprintln!("{}", colours.error(resolve_error.to_string().trim_end()));

    if resolve_error.is_no_intent() {
        info!("Enable monitoring.acm, monitoring.perses or monitoring.incidents in the UIPlugin");
    } else if resolve_error.is_compatibility_error() {
        info!("Supported features come from --features, --cluster-version and --acm-version");
    }
}

fn run() -> Result<()> {
    let args = cli::args::parse_args();
    cli::args::validate_args(&args)?;

    let config_manager = app::load_configuration(&args)?;
    let log_config = app::configure_logging(&args, &config_manager)?;
    logging::init_logger(log_config)?;

    let rendered = app::run_resolve(&args, &config_manager)?;
    print!("{}", rendered);
    if !rendered.ends_with('\n') {
        println!();
    }
    Ok(())
}
