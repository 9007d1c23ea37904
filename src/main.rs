use chatrelay::configuration::get_configuration;
use chatrelay::startup::run;
use chatrelay::storage::Storage;
use chatrelay::telemetry::{get_subscriber, init_subscriber};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use std::net::TcpListener;
use std::time::Duration;

fn io_error(err: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, err.to_string())
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber("chatrelay".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber).map_err(io_error)?;

    let settings = get_configuration().map_err(|err| {
        tracing::error!("Failed to read configuration: {}", err);
        io_error(err)
    })?;

    tracing::info!(
        db_host = %settings.database.host,
        db_port = settings.database.port,
        db_name = %settings.database.database_name,
        "Connecting to PostgreSQL"
    );

    let connect_options = PgConnectOptions::new()
        .host(&settings.database.host)
        .port(settings.database.port)
        .username(&settings.database.username)
        .password(&settings.database.password)
        .database(&settings.database.database_name)
        .ssl_mode(PgSslMode::Prefer);

    let pg_pool = PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .acquire_timeout(Duration::from_secs(settings.database.acquire_timeout_secs))
        .connect_with(connect_options)
        .await
        .map_err(|err| {
            tracing::error!("Failed to connect to database: {}", err);
            io_error(err)
        })?;

    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .map_err(|err| {
            tracing::error!("Failed to run migrations: {}", err);
            io_error(err)
        })?;

    let address = format!("{}:{}", settings.app_host, settings.app_port);
    tracing::info!("Start server at {:?}", &address);
    let listener = TcpListener::bind(&address)?;

    run(listener, Storage::postgres(pg_pool), settings).await?.await
}
