//! Extraction for the heading-based template (`newest`)
//!
//! Each listing is an `h2` whose text carries the name plus "RAM <n>GB" and
//! "ROM <n>GB"; the remaining specs live in the first link after it.

use crate::extract::dom::{next_element_after, selector, text_of, trimmed_text};
use crate::extract::fields::{self, extract_spec_value, RAM_IN_NAME, ROM_IN_NAME};
use crate::extract::layout::is_listing_heading;
use crate::extract::{ExtractError, LayoutVariant, ListingExtractor};
use crate::record::ListingRecord;
use scraper::{ElementRef, Html};

#[derive(Debug, Clone, Copy, Default)]
pub struct HeadingExtractor;

impl ListingExtractor for HeadingExtractor {
    fn variant(&self) -> LayoutVariant {
        LayoutVariant::Newest
    }

    fn candidates<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        let Some(h2) = selector("h2") else {
            return Vec::new();
        };

        document
            .select(&h2)
            .filter(|heading| is_listing_heading(&text_of(*heading)))
            .collect()
    }

    fn extract(&self, heading: ElementRef<'_>) -> Result<ListingRecord, ExtractError> {
        let name = trimmed_text(heading);
        if name.is_empty() {
            return Err(ExtractError::MissingName);
        }
        if !is_listing_heading(&name) {
            return Err(ExtractError::NotAListing(name));
        }

        let mut record = ListingRecord::named(name);
        record.ram = extract_spec_value(&record.name, &RAM_IN_NAME);
        record.storage = extract_spec_value(&record.name, &ROM_IN_NAME);

        if let Some(link) = next_element_after(heading, "a") {
            let details = text_of(link);
            record.price = fields::price_in_text(&details);
            record.camera = fields::camera_mp(&details);
            record.screen_size = fields::screen_inches(&details);
            record.battery = fields::battery_mah(&details);
            record.release_year = fields::release_year(&details);
        }

        Ok(record)
    }
}
