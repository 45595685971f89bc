//! # Domain Models
//!
//! Validated value types shared by the adapters and workflows.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Ticker symbol sent to quote providers |
//! | [`Quote`] | Price snapshot with previous close and listing metadata |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Construction validates every invariant, so a `Quote` holding a NaN price
//! cannot exist.

mod quote;
mod symbol;
mod timestamp;

pub use quote::Quote;
pub use symbol::Symbol;
pub use timestamp::UtcDateTime;
