use std::env;

use prepq::sqlite::SqliteConnection;

pub fn setup_if_needed() {
    let _ = dotenvy::dotenv();
    let _ = env_logger::builder().is_test(true).try_init();
}

// Make a new connection
// Ensure [dotenvy] and [env_logger] have been setup
pub fn new() -> anyhow::Result<SqliteConnection> {
    setup_if_needed();

    let url = env::var("DATABASE_URL").unwrap_or_else(|_| String::from("sqlite::memory:"));
    log::debug!("connecting to {url}");

    Ok(SqliteConnection::connect(&url)?)
}
