//! Bear and bull market regimes.
//!
//! - Detector: threshold rule over a price sequence, producing bear intervals
//! - Synthesizer: fills the gaps around bear intervals with bull markets
//! - Types: intervals, regimes, and the resulting timeline

pub mod detector;
pub mod synthesizer;
pub mod types;

pub use detector::{detect, BearMarketDetector, RegimeError, RegimeResult, MIN_SERIES_LEN};
pub use synthesizer::synthesize;
pub use types::{BearInterval, MarketType, Regime, Timeline};
