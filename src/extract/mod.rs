//! Listing extraction from catalog pages
//!
//! This module turns one page of HTML into candidate listing records:
//! - Field parsers for prices and unit-tagged spec values (`fields`)
//! - Layout variant detection (`layout`)
//! - One `ListingExtractor` per layout variant (`panel`, `newest`)
//! - Page-level orchestration with per-product failure isolation (`page`)

mod dom;
pub mod fields;
mod layout;
mod newest;
mod page;
mod panel;
mod rules;

pub use fields::{clean_price, extract_spec_value};
pub use layout::{classify_layout, LayoutVariant, NEW_LAYOUT_FROM_PAGE, PRODUCT_PANEL_CLASS};
pub use newest::HeadingExtractor;
pub use page::{extract_page, extract_page_as, PageExtraction};
pub use panel::{PanelExtractor, SpecSummary};
pub use rules::{first_present, Rule};

use crate::record::ListingRecord;
use scraper::{ElementRef, Html};
use thiserror::Error;

/// Reasons a single product could not become a record
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no listing name found")]
    MissingName,

    #[error("heading is not a listing: {0}")]
    NotAListing(String),
}

/// Extraction strategy for one layout variant
///
/// `candidates` finds the elements that each describe one listing and
/// `extract` turns one of them into a record.
pub trait ListingExtractor {
    /// The variant this extractor handles
    fn variant(&self) -> LayoutVariant;

    /// Elements of the page that each describe one listing
    fn candidates<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>>;

    /// Extracts one listing from a candidate element
    fn extract(&self, element: ElementRef<'_>) -> Result<ListingRecord, ExtractError>;

    /// Whether extracted records need a price before they are accepted
    fn requires_price(&self) -> bool {
        self.variant().requires_price()
    }
}

/// Returns the extractor for a layout variant
pub fn extractor_for(variant: LayoutVariant) -> Box<dyn ListingExtractor> {
    match variant {
        LayoutVariant::Old => Box::new(PanelExtractor::old_layout()),
        LayoutVariant::New => Box::new(PanelExtractor::new_layout()),
        LayoutVariant::Newest => Box::new(HeadingExtractor),
    }
}
