//! Token Gate - local runner for the Authorizer and Introspector handlers.

use std::process::ExitCode;

use clap::Parser;
use serde::Serialize;
use tracing::error;

use token_gate::{
    Authorizer, Introspector,
    authorizer::TokenAuthorizerEvent,
    cli::{Cli, Command},
    config::Config,
    http::build_client,
    introspector::IntrospectionEvent,
    oidc::DiscoveryDocument,
    setup_tracing,
};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = setup_tracing(&cli.log_level, cli.log_format.as_deref(), true) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        }
    };

    let http = match build_client(&config.http()) {
        Ok(client) => client,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Command::Authorize { token, method_arn } => {
            let authorizer = match Authorizer::from_config(&config, http) {
                Ok(a) => a,
                Err(e) => {
                    error!("{e}");
                    return ExitCode::FAILURE;
                }
            };
            let event = TokenAuthorizerEvent {
                authorization_token: Some(token),
                method_arn,
            };
            print_json(&authorizer.authorize(&event).await)
        }

        Command::Introspect { token, issuer } => {
            let introspector = match Introspector::from_config(&config, http) {
                Ok(i) => i,
                Err(e) => {
                    error!("{e}");
                    return ExitCode::FAILURE;
                }
            };
            let event = IntrospectionEvent::new(Some(issuer.as_str()), Some(token.as_str()));
            let response = introspector.introspect(&event).await;
            let code = print_json(&response);
            if response.status_code == 200 {
                code
            } else {
                ExitCode::FAILURE
            }
        }

        Command::Discover { issuer } => match DiscoveryDocument::discover(&http, &issuer).await {
            Ok(document) => print_json(&document),
            Err(e) => {
                eprintln!("❌ {e}");
                ExitCode::FAILURE
            }
        },
    }
}

fn print_json<T: Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Failed to serialize to JSON: {e}");
            ExitCode::FAILURE
        }
    }
}
