//! Data access port trait.

use crate::domain::error::SigtraderError;
use crate::domain::ohlcv::Bar;

/// Source of daily bars for one symbol, oldest first. Validation happens in
/// `Series::new`, so an adapter may hand back whatever it has.
pub trait DataPort: Sync {
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<Bar>, SigtraderError>;
}
