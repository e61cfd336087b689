//! Analysis pipeline stages.
//!
//! Data flows through this module in dependency order:
//!
//! 1. **Alignment** ([`align`]): join irregular series to a common
//!    timeline by nearest match within tolerance
//! 2. **Segmentation** ([`segment`]): label each aligned row with a
//!    trend or macro phase from a reference channel
//! 3. **Lag sweep** ([`sweep`]): shift-and-recorrelate across an offset
//!    range to locate the offset of strongest phase divergence
//! 4. **Daily lags** ([`lag`]): per-day peak-to-peak lag estimation and
//!    lag-adjusted timestamp shifting

pub mod align;
pub mod lag;
pub mod segment;
pub mod sweep;

pub use align::{align, AlignChannel, AlignReport, AlignedRow, AlignedTable};
pub use lag::{apply_daily_lags, estimate_daily_lags, DailyLag};
pub use segment::{label_macro, label_trend};
pub use sweep::lag_sweep;
