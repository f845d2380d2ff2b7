pub mod anomaly;
pub mod result;
pub mod value;

pub use anomaly::{AnomalyDetector, DetectorError, ZScoreDetector};
pub use result::{AnomalyOutcome, QueryResult};
pub use value::{DataType, Value};
