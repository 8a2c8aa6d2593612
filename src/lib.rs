pub mod clients;
pub mod commands;
pub mod commit;
pub mod config;
pub mod elements;
pub mod error;
pub mod remote;

mod app;

// Re-export App and Config from modules
pub use app::App;
pub use config::Config;
pub use error::Error;

// Disable colors for all tests to get clean output
#[cfg(test)]
#[ctor::ctor]
fn init_tests() {
    colored::control::set_override(false);
}
