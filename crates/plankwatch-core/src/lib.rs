pub mod app_config;
pub mod config;
pub mod product;
pub mod regions;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env, ConfigError};
pub use product::{external_id, ProductType, Retailer, ScrapedProduct};
pub use regions::{lookup_region, RegionStore, REGION_STORES};
