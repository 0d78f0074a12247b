//! Statistics over date-aligned series: rolling Pearson correlation and the
//! threshold scan built on top of it.

pub mod rolling;
pub mod scan;

pub use rolling::{
    CorrelationError, CorrelationPoint, RollingCorrelation, pearson, pearson_complete_pairs,
    rolling_correlation,
};
pub use scan::{CorrelationHit, ScanError, scan};
