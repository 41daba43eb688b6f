//! Serverless entry point for the gateway TOKEN authorizer.

use lambda_runtime::{Error, LambdaEvent, service_fn};
use tracing::info;

use token_gate::{
    Authorizer,
    authorizer::{AuthorizerResponse, TokenAuthorizerEvent},
    config::Config,
    http::build_client,
    setup_tracing,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let path = std::env::var_os("TOKEN_GATE_CONFIG").map(std::path::PathBuf::from);
    let config = Config::load(path.as_deref())?;
    setup_tracing(&config.log_level, config.log_format.as_deref(), false)?;

    let authorizer = Authorizer::from_config(&config, build_client(&config.http())?)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        issuers = %authorizer.issuers(),
        audiences = %authorizer.audiences(),
        "Starting authorizer"
    );
    let authorizer = &authorizer;

    lambda_runtime::run(service_fn(
        move |event: LambdaEvent<TokenAuthorizerEvent>| async move {
            Ok::<AuthorizerResponse, Error>(authorizer.authorize(&event.payload).await)
        },
    ))
    .await
}
