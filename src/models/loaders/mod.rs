pub mod toml_loader;

pub use toml_loader::{load_portal_registry, parse_portal_registry};
