use clap::Parser;
use migration::{Migrator, MigratorTrait};
use serde::Serialize;

mod cli;
mod settings;

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let cli = cli::Cli::parse();
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "tally={level},engine={level}",
            level = settings.app.level
        ))
        .with_writer(std::io::stderr)
        .init();

    let url = cli
        .database_url
        .clone()
        .unwrap_or_else(|| settings.database.url());
    let db = parse_database(&url).await?;
    let engine = engine::Engine::builder().database(db).build().await?;

    match cli::run(&engine, cli.command).await {
        Ok(output) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(())
        }
        Err(err) => {
            let message = if err.is_internal() {
                tracing::error!("internal error: {err}");
                "internal error".to_string()
            } else {
                err.to_string()
            };
            let body = ErrorBody {
                error: err.code().as_str(),
                message,
            };
            eprintln!("{}", serde_json::to_string(&body)?);
            std::process::exit(1);
        }
    }
}

async fn parse_database(
    url: &str,
) -> Result<sea_orm::DatabaseConnection, Box<dyn std::error::Error + Send + Sync>> {
    tracing::debug!("connecting to {url}");
    let database = sea_orm::Database::connect(url).await?;
    Migrator::up(&database, None).await?;
    Ok(database)
}
