//! Listing data model
//!
//! - `ListingRecord`: one smartphone observation, one CSV row
//! - `SpecNumber`: a spec value that is integral unless the source text had a decimal point

mod listing;
mod spec_number;

pub use listing::{ListingRecord, COLUMNS};
pub use spec_number::SpecNumber;
