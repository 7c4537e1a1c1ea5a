use craiyon::{Client, ClientConfig, Model, Protocol, RequestOptions};
use std::env;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let env_loaded = dotenv::dotenv().is_ok();

    let json_logs = env::var("CRAIYON_LOG_FORMAT").map_or(false, |format| format == "json");
    craiyon::logger::init_with_config(
        craiyon::logger::LoggerConfig::development()
            .with_level(craiyon::logger::LogLevel::Info)
            .with_json_output(json_logs),
    )?;

    if env_loaded {
        log::info!(".env file loaded");
    } else {
        log::warn!("No .env file found, using system environment variables");
    }

    let prompt = env::args().skip(1).collect::<Vec<_>>().join(" ");
    if prompt.trim().is_empty() {
        eprintln!("usage: craiyon <prompt>");
        std::process::exit(2);
    }

    let protocol: Protocol = match env::var("CRAIYON_PROTOCOL") {
        Ok(value) => value.parse()?,
        Err(_) => Protocol::default(),
    };
    let config = ClientConfig::from_env()?;
    let client = Client::new(protocol, config)?;
    log::info!("Using {} client: {:?}", protocol, client);

    let mut options = RequestOptions::new(prompt);
    if let Ok(model) = env::var("CRAIYON_MODEL") {
        options = options.with_model(model.parse::<Model>()?);
    }
    if let Ok(negative_prompt) = env::var("CRAIYON_NEGATIVE_PROMPT") {
        options = options.with_negative_prompt(negative_prompt);
    }

    let output_dir = PathBuf::from(env::var("CRAIYON_OUTPUT_DIR").unwrap_or_else(|_| ".".into()));
    tokio::fs::create_dir_all(&output_dir).await?;

    let output = client.generate(&options).await?;
    if let Some(version) = output.version() {
        log::info!("Backend model version: {}", version);
    }

    for (i, image) in output.images().iter().enumerate() {
        let path = output_dir.join(format!("craiyon-{}.jpg", i + 1));
        image.save_async(&path).await?;
        println!("{}", path.display());
    }

    Ok(())
}
