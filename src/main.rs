// src/main.rs
use clap::Parser;
use log::LevelFilter;
use log4rs::{
    append::console::ConsoleAppender,
    append::file::FileAppender,
    config::{Appender, Root},
    encode::pattern::PatternEncoder,
    filter::threshold::ThresholdFilter,
    Config,
};
use notion_site::{
    create_router, AppError, AppState, CommandLineInput, NotionHttpClient, NotionRepository,
    SiteConfig,
};
use std::fs;
use std::sync::Arc;

/// Sets up logging configuration.
fn setup_logging(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let log_level = if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let log_file_path = std::env::temp_dir().join("notion_site.log");
    if let Some(parent) = log_file_path.parent() {
        fs::create_dir_all(parent)?;
    }

    let stdout_appender = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}",
        )))
        .build();

    let file_appender = FileAppender::builder()
        .encoder(Box::new(PatternEncoder::new(
            "{d(%Y-%m-%d %H:%M:%S)} [{l}] {t} - {m}{n}",
        )))
        .build(&log_file_path)?;

    let config = Config::builder()
        .appender(
            Appender::builder()
                .filter(Box::new(ThresholdFilter::new(log_level)))
                .build("stdout", Box::new(stdout_appender)),
        )
        .appender(Appender::builder().build("file", Box::new(file_appender)))
        .build(
            Root::builder()
                .appender("stdout")
                .appender("file")
                .build(LevelFilter::Debug),
        )?;

    log4rs::init_config(config)?;
    log::info!("Logging initialized. Log file: {}", log_file_path.display());
    Ok(())
}

/// Builds the Notion client, if a token is configured.
fn connect(config: &SiteConfig) -> Result<Option<Arc<dyn NotionRepository>>, AppError> {
    let Some(api_key) = &config.api_key else {
        return Ok(None);
    };

    let client = NotionHttpClient::new(api_key, config.proxy.as_ref(), config.request_timeout)?;
    Ok(Some(Arc::new(client)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = CommandLineInput::parse();

    setup_logging(cli.verbose)?;

    let config = SiteConfig::resolve(cli)?;
    log::info!(
        "Serving {} configured page(s); portfolio database: {}",
        config.pages.pages.len(),
        config.pages.database_id.as_deref().unwrap_or("none")
    );

    let repository = connect(&config)?;
    let bind = config.bind;
    let app = create_router(AppState::new(config, repository));

    let listener = tokio::net::TcpListener::bind(bind).await?;
    log::info!("Listening on {}", bind);

    axum::serve(listener, app).await?;

    Ok(())
}
