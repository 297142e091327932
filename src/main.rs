mod api;
mod config;
mod database;
mod maintenance;
mod middleware;
mod models;
mod seeds;
mod services;
mod state;
mod utils;

use actix_cors::Cors;
use actix_web::{
    http::header,
    middleware::{Compress, Logger},
    web, App, HttpServer,
};
use clap::{Parser, Subcommand};
use dotenv::dotenv;
use std::sync::Arc;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::Config;
use crate::database::{MemoryStore, MongoStore, Store};
use crate::state::AppState;

#[derive(Parser)]
#[command(name = "vault-server", version, about = "The Vault backend")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print every user with their email
    ListUsers,
    /// Print every stored notification
    CheckNotifications,
    /// Delete all generated @bot.com accounts
    RemoveBots,
    /// Set a new password for the admin account
    ResetAdminPassword {
        #[arg(long, env = "ADMIN_PASSWORD")]
        password: String,
    },
}

/// MongoDB when reachable. The server falls back to memory; operator
/// commands need the real database.
async fn connect_store(config: &Config, allow_memory: bool) -> std::io::Result<Arc<dyn Store>> {
    let failure = match config.mongo_uri.as_deref() {
        Some(uri) => match MongoStore::connect(uri, &config.database_name).await {
            Ok(store) => {
                log::info!("✅ MongoDB connected (database: {})", config.database_name);
                return Ok(Arc::new(store));
            }
            Err(e) => format!("MongoDB connection failed: {}", e),
        },
        None => "MONGO_URI is not set".to_string(),
    };

    if allow_memory {
        log::warn!("⚠️  {}. Using in-memory storage, data will not survive a restart", failure);
        Ok(Arc::new(MemoryStore::new()))
    } else {
        Err(std::io::Error::other(failure))
    }
}

async fn run_maintenance(command: Command, config: &Config) -> std::io::Result<()> {
    let store = connect_store(config, false).await?;
    let store = store.as_ref();
    let to_io = |e: utils::error::AppError| std::io::Error::other(e.to_string());

    match command {
        Command::Serve => {}
        Command::ListUsers => {
            for line in maintenance::list_users(store).await.map_err(to_io)? {
                println!("{}", line);
            }
        }
        Command::CheckNotifications => {
            for line in maintenance::check_notifications(store).await.map_err(to_io)? {
                println!("{}", line);
            }
        }
        Command::RemoveBots => {
            let removed = maintenance::remove_bots(store).await.map_err(to_io)?;
            println!("Deleted {} bot users.", removed);
        }
        Command::ResetAdminPassword { password } => {
            let updated = maintenance::reset_admin_password(store, config, &password)
                .await
                .map_err(to_io)?;
            println!("Updated: {} user(s)", u8::from(updated));
        }
    }
    Ok(())
}

fn cors(config: &Config) -> Cors {
    let cors = if config.cors_origins.is_empty() {
        Cors::default().allow_any_origin()
    } else {
        config
            .cors_origins
            .iter()
            .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
    };

    cors.allowed_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers(vec![header::CONTENT_TYPE])
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let cli = Cli::parse();
    let config = Config::from_env();

    let command = cli.command.unwrap_or(Command::Serve);
    if !matches!(command, Command::Serve) {
        return run_maintenance(command, &config).await;
    }

    log::info!("🚀 Starting The Vault...");
    let store = connect_store(&config, true).await?;

    if let Err(e) = seeds::admin_seed::ensure_admin(store.as_ref(), &config).await {
        log::error!("❌ Admin seed failed: {}", e);
    }

    let bind = (config.host.clone(), config.port);
    log::info!("🌐 Server starting on {}:{} ({} storage)", bind.0, bind.1, store.backend());
    log::info!("📚 Swagger UI available at: http://{}:{}/swagger-ui/", bind.0, bind.1);

    let state = web::Data::new(AppState::new(store, config));
    let openapi = api::swagger::ApiDoc::openapi();

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .app_data(api::json_config(state.config.json_limit))
            .wrap(middleware::json_error_pages())
            .wrap(middleware::RequestMetrics)
            .wrap(middleware::SecurityHeaders)
            .wrap(cors(&state.config))
            .wrap(Compress::default())
            .wrap(Logger::default())
            .service(SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()))
            .configure(api::configure)
    })
    .bind(bind)?
    .run()
    .await
}
