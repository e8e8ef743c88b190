//! HTTP API handlers for foodprint-ce

pub mod calculate;
pub mod health;
pub mod settings;

pub use calculate::emissions_routes;
pub use health::health_routes;
pub use settings::settings_routes;
