pub mod loaders;
pub mod portal;
pub mod tender;

pub use loaders::{load_portal_registry, parse_portal_registry};
pub use portal::{PortalConfig, PortalRegistry, ScraperKind, SelectorSet};
pub use tender::{crawl_timestamp, TenderRecord, STANDARD_FIELDS};
