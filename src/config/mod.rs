/// Database connection and table creation
pub mod database;

/// Application settings from coinvault.toml and environment variables
pub mod settings;

pub use settings::Settings;
