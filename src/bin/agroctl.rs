use arrrg::CommandLine;
use arrrg_derive::CommandLine;

use agro::{cli_utils, commands::handle_farmer_command, http_utils};

#[derive(CommandLine, Default, PartialEq, Eq)]
struct Options {
    #[arrrg(optional, "Base URL of the Agro API server")]
    base_url: String,
}

const USAGE: &str = r#"Usage: agroctl [options] <command> [args...]

Options:
  --base-url <url>     Base URL of the Agro API server (default: http://localhost:8080)

Commands:
  health                                       Show the server's name and version
  farmer list [limit] [offset]                 List farmers (default limit 20)
  farmer create <farmer-json>                  Register a farmer
  farmer update <cpf-cnpj> <changes-json>      Partially update a farmer
  farmer delete <cpf-cnpj>                     Delete a farmer

Example:
  agroctl farmer create '{"cpf_cnpj":"42063478082","name":"Fazendeiro 123",
    "farm_name":"Fazenda LOTR","city":"Joao Pessoa","state":"PB","total_area":100,
    "agricultural_area":40,"vegetation_area":50,"farming_options":["SUGARCANE"]}'"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let (options, free) = Options::from_command_line_relaxed("USAGE: agroctl <command> [args...]");

    if free.is_empty() {
        cli_utils::exit_with_usage_error("No command specified", USAGE);
    }

    let base_url = if options.base_url.is_empty() {
        "http://localhost:8080".to_string()
    } else {
        options.base_url
    };

    let client = http_utils::AgroClient::new(base_url);

    match free[0].as_str() {
        "health" => {
            let health = http_utils::execute_or_exit(
                || client.health::<serde_json::Value>(),
                "Failed to reach server",
            )
            .await;
            cli_utils::print_json_or_exit(&health, "health");
        }
        "farmer" => {
            handle_farmer_command(&free[1..], &client).await;
        }
        _ => {
            cli_utils::exit_with_error(&format!(
                "Unknown command '{}'. Available commands: health, farmer",
                free[0]
            ));
        }
    }

    Ok(())
}
