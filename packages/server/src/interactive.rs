//! Interactive mode for the server.
//!
//! Prompts the user for bind address, port and data source before starting
//! the server.

use dialoguer::{Confirm, Input};

/// Runs the server in interactive mode, prompting for configuration.
///
/// Asks the user for a bind address, port and `DuckDB` file, sets the
/// corresponding environment variables (`BIND_ADDR`, `PORT`,
/// `THEFT_MAP_DB`), and delegates to [`super::run_server`].
///
/// # Errors
///
/// Returns an `std::io::Result` error if the underlying server fails to
/// start.
#[allow(clippy::future_not_send)]
pub async fn run() -> std::io::Result<()> {
    println!("Theft Map Server");
    println!();

    let bind_addr: String = Input::new()
        .with_prompt("Bind address")
        .default(super::DEFAULT_BIND_ADDR.to_string())
        .interact_text()
        .unwrap_or_else(|_| super::DEFAULT_BIND_ADDR.to_string());

    let port_str: String = Input::new()
        .with_prompt("Port")
        .default(super::DEFAULT_PORT.to_string())
        .interact_text()
        .unwrap_or_else(|_| super::DEFAULT_PORT.to_string());

    let default_db = std::env::var("THEFT_MAP_DB").unwrap_or_else(|_| {
        theft_map_database::paths::default_db_path()
            .display()
            .to_string()
    });
    let db_path: String = Input::new()
        .with_prompt("Theft database")
        .default(default_db.clone())
        .interact_text()
        .unwrap_or(default_db);

    // SAFETY: We are single-threaded at this point (before server starts) and
    // these variables are only read once during server initialisation.
    unsafe {
        std::env::set_var("BIND_ADDR", &bind_addr);
        std::env::set_var("PORT", &port_str);
        std::env::set_var("THEFT_MAP_DB", &db_path);
    }

    if !Confirm::new()
        .with_prompt(format!("Start server on {bind_addr}:{port_str}?"))
        .default(true)
        .interact()
        .unwrap_or(true)
    {
        println!("Cancelled.");
        return Ok(());
    }

    super::run_server().await
}
