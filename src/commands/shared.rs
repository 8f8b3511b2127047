//! # Shared Command Utilities
//!
//! Argument validation and dispatch helpers used by every command handler.

use crate::{CpfCnpj, cli_utils};

/// Validates and parses a CPF or CNPJ, exiting with the validation message on failure.
///
/// # Arguments
/// * `raw` - The identifier as typed by the user
///
/// # Returns
/// The parsed identifier, or exits the program with an error message
pub fn parse_cpf_cnpj_or_exit(raw: &str) -> CpfCnpj {
    CpfCnpj::parse(raw).unwrap_or_else(|e| {
        cli_utils::exit_with_error(&format!("{}: {}", e, raw));
    })
}

/// Parses a non-negative integer argument, exiting with an error on failure.
pub fn parse_count_or_exit(raw: &str, name: &str) -> i64 {
    match raw.parse::<i64>() {
        Ok(value) if value >= 0 => value,
        _ => cli_utils::exit_with_error(&format!(
            "{} must be a non-negative integer, got '{}'",
            name, raw
        )),
    }
}

/// Validates both minimum and maximum argument counts.
///
/// # Arguments
/// * `args` - The command arguments array
/// * `min_count` - The minimum number of arguments required (including subcommand)
/// * `max_count` - The maximum number of arguments allowed (including subcommand)
/// * `command` - The command name for error message
/// * `usage` - The usage string to display
pub fn validate_args_count_or_exit(
    args: &[String],
    min_count: usize,
    max_count: usize,
    command: &str,
    usage: &str,
) {
    if args.len() < min_count {
        cli_utils::exit_with_usage_error(
            &format!("{} command requires more arguments", command),
            usage,
        );
    }
    if args.len() > max_count {
        cli_utils::exit_with_usage_error(
            &format!("{} command has too many arguments", command),
            usage,
        );
    }
}

/// Macro to generate command dispatcher boilerplate.
macro_rules! dispatch_command {
    ($command_name:expr, $usage:expr, $args:expr, $client:expr, {
        $($subcommand:expr => $handler:expr),* $(,)?
    }) => {
        if $args.is_empty() {
            crate::cli_utils::exit_with_usage_error(
                &format!("{} command requires a subcommand", $command_name),
                $usage,
            );
        }

        match $args[0].as_str() {
            $(
                $subcommand => $handler($args, $client).await,
            )*
            _ => {
                let available_subcommands = [$($subcommand),*];
                crate::cli_utils::exit_with_error(&format!(
                    "Unknown {} subcommand '{}'. Available subcommands: {}",
                    $command_name,
                    $args[0],
                    available_subcommands.join(", ")
                ));
            }
        }
    };
}

pub(crate) use dispatch_command;
