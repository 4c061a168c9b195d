pub mod config;
pub mod error;
pub mod core {
    pub mod nutrition;
    pub mod plans;
    pub mod profile;
    pub mod user;
}
pub mod ai {
    pub mod client;
    pub mod generator;
    pub mod prompts;
    pub mod schema_utils;
}
pub mod store;
pub mod views;

pub use ai::client::GeminiClient;
pub use ai::generator::{PlanGenerator, PlanSource};
pub use config::Config;
pub use error::FitError;
