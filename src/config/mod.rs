/// Database configuration and connection management
pub mod database;

/// Organization settings and seed roster from portfolio.toml
pub mod settings;
