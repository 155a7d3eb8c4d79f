//! Configuration: application config file and user preferences

mod app;
mod preferences;

pub use app::AppConfig;
pub use preferences::Preferences;
