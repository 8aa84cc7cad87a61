//! Guest Clock Bench - command line entry point

use clap::Parser;
use guest_clock_bench::{app::App, cli::Cli, error::AppError, error::ErrorReporter};
use std::error::Error;
use std::process;

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panic: {}", panic_info);
        process::exit(99);
    }));

    let cli = Cli::parse();
    let reporter = ErrorReporter::new(cli.use_colors(), cli.verbose || cli.debug);

    if let Err(e) = run_application(cli).await {
        reporter.report_error(&e);

        if let Some(source) = e.source() {
            eprintln!("Caused by: {}", source);
        }

        print_error_suggestions(&e);
        process::exit(e.exit_code());
    }
}

async fn run_application(cli: Cli) -> Result<(), AppError> {
    App::new(cli)?.run().await?;
    Ok(())
}

/// Print helpful suggestions for common errors
fn print_error_suggestions(error: &AppError) {
    match error {
        AppError::Config(_) => {
            eprintln!();
            eprintln!("Configuration help:");
            eprintln!("  - Clock types are TIME, RTC and KVM");
            eprintln!("  - Contention levels are NONE and HIGH");
            eprintln!("  - Run with --help-topic env to list environment variables");
        }
        AppError::Device(_) => {
            eprintln!();
            eprintln!("Device troubleshooting:");
            eprintln!("  - Check that `adb devices` lists the guest");
            eprintln!("  - Pass --serial when more than one device is attached");
            eprintln!("  - Make sure the guest work directory is writable");
        }
        AppError::Parse(_) => {
            eprintln!();
            eprintln!("Parse troubleshooting:");
            eprintln!("  - Inspect raw_times/ for truncated or empty logs");
            eprintln!("  - Aggregate files were left untouched by this run");
        }
        _ => {}
    }
}
