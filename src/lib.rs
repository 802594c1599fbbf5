pub mod config;
pub mod data;
pub mod error;
pub mod extrema;
pub mod pipeline;
pub mod regime;
pub mod report;
pub mod validation;

// Re-export commonly used types
pub use config::{AnalysisConfig, ConfigError};
pub use data::{PricePoint, PriceSeries, PriceSource, SeriesLoader, UpstreamError, YahooClient};
pub use error::{AnalysisError, AnalysisResult};
pub use extrema::{find_local_extrema, find_optimal_window_size, LocalExtremum, WindowSelection};
pub use pipeline::RegimeAnalyzer;
pub use regime::{detect, synthesize, BearInterval, BearMarketDetector, MarketType, Regime, RegimeError, Timeline};
pub use report::{CsvRegimeSink, JsonRegimeSink, MemorySink, RegimeReport, RegimeSink, RegimeStats, RegimeTable};
pub use validation::{SeriesIntegrityReport, SeriesValidator};
