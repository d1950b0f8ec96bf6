//! Layout variant detection
//!
//! The catalog migrated templates around page 202 and again near page 269,
//! and rollouts were uneven, so the variant is detected per page from the
//! markup and the page index only breaks ties.

use crate::extract::dom::{class_contains, has_class, selector, text_of};
use scraper::Html;
use std::fmt;

/// Page index from which pages default to the `new` layout
pub const NEW_LAYOUT_FROM_PAGE: u32 = 202;

/// Class of a product panel in the panel-based templates
pub const PRODUCT_PANEL_CLASS: &str = "styles_productPanel__Tlvp6";

/// Headings needed before the heading-based template is considered
const NEWEST_MIN_HEADINGS: usize = 5;

/// Page template generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutVariant {
    /// Panel template with seller-link prices (pages 1-201)
    Old,
    /// Panel template with inline prices (pages 202+)
    New,
    /// Heading-per-listing template (pages ~269+)
    Newest,
}

impl LayoutVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Old => "old",
            Self::New => "new",
            Self::Newest => "newest",
        }
    }

    /// Whether records from this layout need a price to be accepted
    pub fn requires_price(&self) -> bool {
        !matches!(self, Self::Newest)
    }

    /// Variant assumed when no markup probe matches
    pub fn default_for_page(page_index: u32) -> Self {
        if page_index >= NEW_LAYOUT_FROM_PAGE {
            Self::New
        } else {
            Self::Old
        }
    }
}

impl fmt::Display for LayoutVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a heading text names a listing in the heading-based template
pub fn is_listing_heading(text: &str) -> bool {
    text.contains("RAM") && text.contains("ROM")
}

/// Classifies a parsed page
///
/// # Detection Order
///
/// 1. More than five `h2` headings, one of them mentioning both RAM and ROM → `Newest`
/// 2. Any `div` whose class contains `productPanel` (or `product` and `Panel`) → `New`
/// 3. Any `div` with the exact product-panel class or a `row` class → `Old`
/// 4. Otherwise the page-index default (`New` from page 202, else `Old`)
pub fn classify_layout(document: &Html, page_index: u32) -> LayoutVariant {
    if has_newest_headings(document) {
        return LayoutVariant::Newest;
    }

    let default_variant = LayoutVariant::default_for_page(page_index);

    if has_new_panels(document) {
        return LayoutVariant::New;
    }

    if has_old_containers(document) {
        return LayoutVariant::Old;
    }

    default_variant
}

fn has_newest_headings(document: &Html) -> bool {
    let Some(h2) = selector("h2") else {
        return false;
    };

    let headings: Vec<_> = document.select(&h2).collect();
    headings.len() > NEWEST_MIN_HEADINGS
        && headings
            .iter()
            .any(|heading| is_listing_heading(&text_of(*heading)))
}

fn has_new_panels(document: &Html) -> bool {
    let Some(div) = selector("div") else {
        return false;
    };

    document.select(&div).any(|element| {
        let class_attr = element.value().attr("class");
        class_contains_exact_case(class_attr, "productPanel")
            || (class_contains_exact_case(class_attr, "product")
                && class_contains_exact_case(class_attr, "Panel"))
    })
}

fn has_old_containers(document: &Html) -> bool {
    let Some(div) = selector("div") else {
        return false;
    };

    document
        .select(&div)
        .any(|element| has_class(element, PRODUCT_PANEL_CLASS) || has_class(element, "row"))
}

/// Case-sensitive substring test over the raw class attribute
fn class_contains_exact_case(class_attr: Option<&str>, needle: &str) -> bool {
    class_attr.map(|c| c.contains(needle)).unwrap_or(false)
}

/// Case-insensitive probe used by the generic container fallback
pub(crate) fn is_product_like(element: scraper::ElementRef<'_>) -> bool {
    ["product", "item", "card", "listing"]
        .iter()
        .any(|term| class_contains(element, term))
}
