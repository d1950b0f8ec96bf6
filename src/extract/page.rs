//! Page-level extraction
//!
//! Classifies a page, selects its listing elements and runs the matching
//! extractor over each one. A product that fails to extract is logged and
//! skipped; it never aborts the rest of the page.

use crate::extract::dom::selector;
use crate::extract::layout::{classify_layout, is_product_like};
use crate::extract::{extractor_for, LayoutVariant};
use crate::record::ListingRecord;
use scraper::{ElementRef, Html};

/// Everything extracted from one page, before dedup and price filtering
#[derive(Debug, Clone)]
pub struct PageExtraction {
    /// 1-based page index
    pub page_index: u32,

    /// Layout the page was extracted as
    pub variant: LayoutVariant,

    /// Number of listing elements found
    pub containers: usize,

    /// Records extracted, in page order
    pub records: Vec<ListingRecord>,

    /// Listing elements that could not be turned into a record
    pub failures: usize,
}

impl PageExtraction {
    /// Whether the page had no listing elements at all
    pub fn is_empty(&self) -> bool {
        self.containers == 0
    }
}

/// Classifies and extracts a page
///
/// # Arguments
///
/// * `html` - Raw page body
/// * `page_index` - 1-based index of the page, used as the layout tie-breaker
pub fn extract_page(html: &str, page_index: u32) -> PageExtraction {
    let document = Html::parse_document(html);
    let variant = classify_layout(&document, page_index);
    tracing::info!("Detected layout type for page {}: {}", page_index, variant);
    extract_document(&document, page_index, variant)
}

/// Extracts a page with a fixed layout variant, skipping classification
pub fn extract_page_as(html: &str, page_index: u32, variant: LayoutVariant) -> PageExtraction {
    let document = Html::parse_document(html);
    extract_document(&document, page_index, variant)
}

fn extract_document(document: &Html, page_index: u32, variant: LayoutVariant) -> PageExtraction {
    let extractor = extractor_for(variant);

    let mut containers = extractor.candidates(document);
    if containers.is_empty() && variant != LayoutVariant::Newest {
        containers = product_like_containers(document);
        if !containers.is_empty() {
            tracing::debug!(
                "Page {}: using {} generic product-like containers",
                page_index,
                containers.len()
            );
        }
    }

    let mut records = Vec::with_capacity(containers.len());
    let mut failures = 0;

    for container in &containers {
        match extractor.extract(*container) {
            Ok(record) => records.push(record),
            Err(e) => {
                failures += 1;
                tracing::warn!(
                    "Error processing a product on page {} ({} layout): {}",
                    page_index,
                    variant,
                    e
                );
            }
        }
    }

    PageExtraction {
        page_index,
        variant,
        containers: containers.len(),
        records,
        failures,
    }
}

/// Last-resort container search: any `div` with a product-like class name
fn product_like_containers(document: &Html) -> Vec<ElementRef<'_>> {
    let Some(div) = selector("div") else {
        return Vec::new();
    };

    document
        .select(&div)
        .filter(|element| is_product_like(*element))
        .collect()
}
