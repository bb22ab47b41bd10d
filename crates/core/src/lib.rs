pub mod blog;
pub mod config;
pub mod error;
pub mod lead;
pub mod seo;
pub mod types;

pub use config::parse_site_toml;
pub use error::{Error, Result};
pub use types::*;
