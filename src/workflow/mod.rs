pub mod card;
pub mod portal_scraper;
pub mod run_state;

pub use card::{CardField, CardFields, CardProfile};
pub use portal_scraper::{PortalScraper, RunResult};
pub use run_state::{Admission, RunState, ScrapePhase};
