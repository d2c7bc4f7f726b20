pub mod pool_apr;

pub use pool_apr::{PoolDayMetrics, PoolDaySnapshot};
