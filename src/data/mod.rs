pub mod loader;
pub mod provider;
pub mod resample;
pub mod types;
pub mod yahoo;

pub use loader::{LoaderError, SeriesLoader, DATE_COLUMN, DEFAULT_PRICE_COLUMN};
pub use provider::{PriceSource, UpstreamError};
pub use resample::{resample_last, WEEKLY_CADENCE_DAYS};
pub use types::{PricePoint, PriceSeries};
pub use yahoo::{YahooClient, YahooError};
