//! Serverless entry point for the token introspection handler.

use lambda_runtime::{Error, LambdaEvent, service_fn};
use tracing::info;

use token_gate::{
    Introspector,
    config::Config,
    http::build_client,
    introspector::{HttpResponse, IntrospectionEvent},
    setup_tracing,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let path = std::env::var_os("TOKEN_GATE_CONFIG").map(std::path::PathBuf::from);
    let config = Config::load(path.as_deref())?;
    setup_tracing(&config.log_level, config.log_format.as_deref(), false)?;

    let introspector = Introspector::from_config(&config, build_client(&config.http())?)?;
    info!(version = env!("CARGO_PKG_VERSION"), "Starting introspector");
    let introspector = &introspector;

    lambda_runtime::run(service_fn(
        move |event: LambdaEvent<IntrospectionEvent>| async move {
            Ok::<HttpResponse, Error>(introspector.introspect(&event.payload).await)
        },
    ))
    .await
}
