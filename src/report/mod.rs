//! Regime tables, statistics and output sinks.

pub mod sink;
pub mod summary;
pub mod table;

pub use sink::{CsvRegimeSink, JsonRegimeSink, MemorySink, RegimeSink, ReportError};
pub use summary::{RegimeReport, RegimeStats};
pub use table::{RegimeRow, RegimeTable, COLUMNS};
