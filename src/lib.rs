pub mod branch;
pub mod clients;
pub mod collaborators;
pub mod commands;
pub mod config;
pub mod error;
pub mod flag;
pub mod header;

mod app;

// Re-export App and Config from modules
pub use app::ANDROID_BRANCH;
pub use app::App;
pub use app::CHROMIUM_BRANCH_PREFIX;
pub use app::Targets;
pub use config::Config;
pub use flag::FlagName;
pub use flag::Target;

// Disable colors for all tests to get clean output
#[cfg(test)]
#[ctor::ctor]
fn init_tests() {
    colored::control::set_override(false);
}
