pub mod levels;
pub mod placeholder;
pub mod report;

pub use levels::{support_resistance, Levels};
pub use placeholder::{OutlookSource, RandomPlaceholder, SignalSource};
pub use report::{DashboardReport, SignalMarker};
