use std::{
    env,
    fs::OpenOptions,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    path::PathBuf,
    sync::Arc,
    time::Duration,
};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    http::HeaderValue,
};
use axum_server::Handle;
use clap::Parser;
use rusqlite::Connection;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use expense_tracker::{
    AppState, DEFAULT_CORS_ORIGIN, build_router, graceful_shutdown, spawn_maintenance_job,
};

/// The GraphQL API server for expense_tracker.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The address to listen on. Listens on all interfaces by default.
    #[arg(long, default_value_t = IpAddr::V4(Ipv4Addr::UNSPECIFIED))]
    host: IpAddr,

    /// The port to serve the API from.
    #[arg(short, long, default_value_t = 4000)]
    port: u16,

    /// The directory containing the built frontend.
    #[arg(long, default_value = "frontend/dist")]
    frontend_dir: PathBuf,

    /// How often to run database maintenance, in minutes.
    #[arg(long, default_value_t = 14, value_parser = clap::value_parser!(u64).range(1..))]
    maintenance_interval_minutes: u64,

    /// The origin allowed to call the GraphQL API with cookies, e.g. a frontend dev server.
    #[arg(long, default_value = DEFAULT_CORS_ORIGIN)]
    cors_origin: String,
}

#[tokio::main]
async fn main() {
    setup_logging();
    dotenvy::dotenv().ok();

    let args = Args::parse();

    let addr = SocketAddr::new(args.host, args.port);

    let secret = env::var("SECRET").expect("The environment variable 'SECRET' must be set");

    let conn = Connection::open(&args.db_path).expect("Could not open the database.");
    let mut app_state = AppState::new(conn, &secret, args.frontend_dir)
        .expect("Could not initialize the database.");
    app_state.cors_origin = HeaderValue::from_str(&args.cors_origin)
        .expect("The CORS origin must be a valid header value");

    let maintenance_job = spawn_maintenance_job(
        app_state.db_connection.clone(),
        Duration::from_secs(args.maintenance_interval_minutes * 60),
    );

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(app_state));

    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .unwrap();

    maintenance_job.abort();
    tracing::info!("Server stopped.");
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are handled.
        .on_failure(());

    router.layer(tracing_layer)
}
