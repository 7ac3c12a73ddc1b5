use std::env;
use std::process::ExitCode;

use dotenv::dotenv;
use search_backend_check::{
    load_document, CheckError, ConfigValidator, CONFIG_PATH_VAR, DEFAULT_CONFIG_PATH,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn run(path: &str) -> Result<(), CheckError> {
    let document = load_document(path)?;
    ConfigValidator::from_env().validate(&document).await?;
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();
    init_tracing();

    let path = env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    info!(path = %path, "Validating search backend configuration");

    match run(&path).await {
        Ok(()) => {
            info!("Search backend configuration is valid");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "Search backend validation failed");
            ExitCode::FAILURE
        }
    }
}
