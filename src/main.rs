use std::net::SocketAddr;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bibliocatalog::config::Config;
use bibliocatalog::infrastructure::{ApiSettings, AppState};
use bibliocatalog::media::MediaStorage;
use bibliocatalog::{auth, db, server};

/// Validity of tokens minted with `--issue-token`
const TOKEN_TTL_HOURS: i64 = 24 * 30;

/// `--issue-token <subject> [--staff] [--superuser]`
fn issue_token_request(args: &[String]) -> Option<(String, bool, bool)> {
    let pos = args.iter().position(|arg| arg == "--issue-token")?;
    let subject = args.get(pos + 1).filter(|s| !s.starts_with("--"))?.clone();
    let is_staff = args.iter().any(|arg| arg == "--staff");
    let is_superuser = args.iter().any(|arg| arg == "--superuser");
    Some((subject, is_staff, is_superuser))
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bibliocatalog=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Load configuration
    dotenvy::dotenv().ok();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let args: Vec<String> = std::env::args().collect();
    if args.iter().any(|arg| arg == "--issue-token") {
        let Some((subject, is_staff, is_superuser)) = issue_token_request(&args) else {
            eprintln!("usage: bibliocatalog --issue-token <subject> [--staff] [--superuser]");
            std::process::exit(2);
        };
        match auth::create_jwt(
            &config.jwt_secret,
            &subject,
            is_staff,
            is_superuser,
            TOKEN_TTL_HOURS,
        ) {
            Ok(token) => println!("{}", token),
            Err(e) => {
                tracing::error!("Failed to issue token: {}", e);
                std::process::exit(1);
            }
        }
        return;
    }

    // Initialize database
    let db = match db::init_db(&config.database_url).await {
        Ok(db) => db,
        Err(e) => {
            tracing::error!("Failed to initialize database: {}", e);
            std::process::exit(1);
        }
    };

    let settings = ApiSettings {
        jwt_secret: config.jwt_secret.clone(),
        default_page_size: config.page_size,
        max_page_size: config.max_page_size,
        max_upload_bytes: config.max_upload_bytes,
    };
    let state = AppState::new(db, settings, MediaStorage::new(&config.media_root));
    let app = server::build_router(state, &config.cors_allowed_origins);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Bibliocatalog server listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_issue_token_arguments() {
        assert_eq!(
            issue_token_request(&args(&["bin", "--issue-token", "ann", "--staff"])),
            Some(("ann".to_string(), true, false))
        );
        assert_eq!(
            issue_token_request(&args(&["bin", "--issue-token", "--staff"])),
            None
        );
        assert_eq!(issue_token_request(&args(&["bin"])), None);
    }
}
