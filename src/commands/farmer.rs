//! # Farmer Command Handler
//!
//! This module handles farmer-related CLI commands: listing, registration,
//! partial updates and deletion.

use serde_json::Value;

use crate::{
    Farmer, cli_utils,
    commands::shared::{
        dispatch_command, parse_count_or_exit, parse_cpf_cnpj_or_exit,
        validate_args_count_or_exit,
    },
    http_utils,
};

const FARMER_USAGE: &str = "Usage: agroctl farmer <list|create|update|delete> [args...]";

/// Handles all farmer-related commands.
///
/// # Arguments
/// * `args` - Command arguments (first element is the subcommand)
/// * `client` - HTTP client for API communication
pub async fn handle_farmer_command(args: &[String], client: &http_utils::AgroClient) {
    dispatch_command!("farmer", FARMER_USAGE, args, client, {
        "list" => handle_farmer_list,
        "create" => handle_farmer_create,
        "update" => handle_farmer_update,
        "delete" => handle_farmer_delete,
    });
}

/// Handles farmer listing command.
async fn handle_farmer_list(args: &[String], client: &http_utils::AgroClient) {
    const USAGE: &str = "Usage: agroctl farmer list [limit] [offset]";
    validate_args_count_or_exit(args, 1, 3, "list", USAGE);

    let mut query = Vec::new();
    if let Some(limit) = args.get(1) {
        query.push(("limit", parse_count_or_exit(limit, "limit").to_string()));
    }
    if let Some(offset) = args.get(2) {
        query.push(("offset", parse_count_or_exit(offset, "offset").to_string()));
    }

    let farmers = http_utils::execute_or_exit(
        || client.get::<Vec<Farmer>>("farmers", &query),
        "Failed to list farmers",
    )
    .await;

    if farmers.is_empty() {
        println!("No farmers found");
    } else {
        cli_utils::print_json_or_exit(&farmers, "farmers");
    }
}

/// Handles farmer registration command.
async fn handle_farmer_create(args: &[String], client: &http_utils::AgroClient) {
    validate_args_count_or_exit(
        args,
        2,
        2,
        "create",
        "Usage: agroctl farmer create <farmer-json>",
    );
    let body = cli_utils::parse_json_or_exit(&args[1], "farmer");

    let farmer = http_utils::execute_or_exit(
        || client.post::<Value, Farmer>("farmers", &body),
        "Failed to create farmer",
    )
    .await;

    cli_utils::print_json_or_exit(&farmer, "farmer");
}

/// Handles farmer partial update command.
async fn handle_farmer_update(args: &[String], client: &http_utils::AgroClient) {
    validate_args_count_or_exit(
        args,
        3,
        3,
        "update",
        "Usage: agroctl farmer update <cpf-cnpj> <changes-json>",
    );
    let cpf_cnpj = parse_cpf_cnpj_or_exit(&args[1]);
    let body = cli_utils::parse_json_or_exit(&args[2], "changes");
    let query = [("cpf_cnpj", cpf_cnpj.to_string())];

    let farmer = http_utils::execute_or_exit(
        || client.patch::<Value, Farmer>("farmers", &query, &body),
        "Failed to update farmer",
    )
    .await;

    cli_utils::print_json_or_exit(&farmer, "farmer");
}

/// Handles farmer deletion command.
async fn handle_farmer_delete(args: &[String], client: &http_utils::AgroClient) {
    validate_args_count_or_exit(
        args,
        2,
        2,
        "delete",
        "Usage: agroctl farmer delete <cpf-cnpj>",
    );
    let cpf_cnpj = parse_cpf_cnpj_or_exit(&args[1]);
    let query = [("cpf_cnpj", cpf_cnpj.to_string())];

    http_utils::execute_or_exit(
        || client.delete::<Value>("farmers", &query),
        "Failed to delete farmer",
    )
    .await;

    println!("Deleted farmer: {}", cpf_cnpj);
}
