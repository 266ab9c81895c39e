//! # Valang CLI

use clap::Parser;
use std::process::ExitCode;
use valang_cli::commands::{self, CommandResult, TranslateOptions, ValidateOptions};
use valang_cli::{Cli, Command, EXIT_REJECTED};
use valang_compiler::config::build_info;
use valang_compiler::config::runtime::{LogLevel, LoggingPreferences};
use valang_compiler::{log_info, logging};

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if cli.verbose {
        let preferences = LoggingPreferences {
            min_log_level: LogLevel::Debug,
            ..LoggingPreferences::default()
        };
        if let Err(e) = logging::config::init_runtime_preferences(preferences) {
            log::warn!("{}", e);
        }
    }
    if let Err(e) = logging::init_global_logging() {
        log::warn!("structured logging unavailable: {}", e);
    }

    log_info!(
        "Valang starting",
        "version" => env!("CARGO_PKG_VERSION"),
        "config" => build_info::source_info()
    );

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(command: Command) -> CommandResult<ExitCode> {
    match command {
        Command::Check { rules } => {
            let summaries = commands::check(&rules)?;
            for summary in &summaries {
                println!("{}", summary);
            }
            println!("\n{} rule(s) OK", summaries.len());
            Ok(ExitCode::SUCCESS)
        }
        Command::Translate {
            rules,
            name,
            install,
            messages,
        } => {
            let options = TranslateOptions {
                name,
                install,
                messages,
            };
            println!("{}", commands::translate(&rules, &options)?);
            Ok(ExitCode::SUCCESS)
        }
        Command::Validate {
            rules,
            target,
            roles,
            index,
        } => {
            let options = ValidateOptions {
                roles,
                default_index: index,
            };
            let errors = commands::validate(&rules, &target, &options)?;
            let json = serde_json::to_string_pretty(&errors)
                .map_err(|e| commands::CommandError::Output(e.to_string()))?;
            println!("{}", json);

            if errors.has_errors() {
                Ok(ExitCode::from(EXIT_REJECTED))
            } else {
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}
