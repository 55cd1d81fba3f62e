#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Theft map API server binary.
//!
//! Pass `--interactive` to be prompted for the bind address and port.

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if std::env::args().skip(1).any(|arg| arg == "--interactive") {
        return theft_map_server::interactive::run().await;
    }

    theft_map_server::run_server().await
}
