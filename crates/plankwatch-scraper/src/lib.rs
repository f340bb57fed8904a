pub mod adapters;
pub mod browser;
pub mod error;
pub mod profile;
pub mod resilience;
pub mod title;
pub mod types;

pub use adapters::{AdapterSettings, Category, HomeDepotAdapter, LowesAdapter, RetailerAdapter};
pub use browser::StealthSession;
pub use error::ScrapeError;
pub use profile::SessionProfile;
pub use resilience::{BackoffPolicy, CircuitBreaker, DelayBounds};
pub use title::TitleAttributes;
