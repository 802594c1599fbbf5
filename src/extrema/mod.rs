//! Local-extrema smoothing and its window size search.

pub mod local;
pub mod window;

pub use local::{extrema_to_dataframe, find_local_extrema, ExtremaError, LocalExtremum};
pub use window::{find_optimal_window_size, score_window, WindowScore, WindowSelection};
