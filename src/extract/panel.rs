//! Extraction for the panel-based templates (`old` and `new`)
//!
//! Both templates wrap every listing in a container element. They share the
//! name, year and spec rules and differ only in where the price lives.

use crate::extract::dom::{
    class_contains, descendant_elements, has_class, is_tag, selector, text_nodes, text_of,
};
use crate::extract::fields::{
    self, clean_price, extract_spec_value, CURRENCY_MARKER, GB_VALUE, RAM_IN_NAME,
    RAM_SUFFIXED, ROM_IN_NAME, STORAGE_SUFFIXED,
};
use crate::extract::rules::{first_present, Rule};
use crate::extract::{ExtractError, LayoutVariant, ListingExtractor};
use crate::extract::layout::PRODUCT_PANEL_CLASS;
use crate::record::{ListingRecord, SpecNumber};
use regex::Regex;
use scraper::{ElementRef, Html};

const PRODUCT_NAME_CLASS: &str = "styles_productName__fr99s";
const YEAR_RELEASED_CLASS: &str = "styles_yearReleased___jyCv";
const SPECS_LIST_CLASS: &str = "styles_primarySpecsList__4s_rn";
const SELLER_TRACKING_PATH: &str = "track/seller";

/// Extractor for one of the two panel templates
#[derive(Debug, Clone, Copy)]
pub struct PanelExtractor {
    variant: LayoutVariant,
}

impl PanelExtractor {
    pub fn old_layout() -> Self {
        Self {
            variant: LayoutVariant::Old,
        }
    }

    pub fn new_layout() -> Self {
        Self {
            variant: LayoutVariant::New,
        }
    }

    fn price(&self, panel: &ProductPanel<'_>) -> Option<u64> {
        match self.variant {
            LayoutVariant::Old => {
                let rules: [Rule<ProductPanel<'_>, u64>; 4] = [
                    price_from_seller_links as Rule<ProductPanel<'_>, u64>,
                    price_from_text_nodes as Rule<ProductPanel<'_>, u64>,
                    price_from_table_cells as Rule<ProductPanel<'_>, u64>,
                    price_from_price_class as Rule<ProductPanel<'_>, u64>,
                ];
                first_present(panel, &rules)
            }
            _ => {
                let rules: [Rule<ProductPanel<'_>, u64>; 2] =
                    [
                        price_from_text_nodes as Rule<ProductPanel<'_>, u64>,
                        price_from_price_class as Rule<ProductPanel<'_>, u64>,
                    ];
                first_present(panel, &rules)
            }
        }
    }
}

impl ListingExtractor for PanelExtractor {
    fn variant(&self) -> LayoutVariant {
        self.variant
    }

    fn candidates<'a>(&self, document: &'a Html) -> Vec<ElementRef<'a>> {
        let Some(div) = selector("div") else {
            return Vec::new();
        };
        let divs: Vec<ElementRef<'a>> = document.select(&div).collect();

        let exact_panels: Vec<_> = divs
            .iter()
            .copied()
            .filter(|el| has_class(*el, PRODUCT_PANEL_CLASS))
            .collect();
        if !exact_panels.is_empty() {
            return exact_panels;
        }

        match self.variant {
            LayoutVariant::Old => divs
                .into_iter()
                .filter(|el| has_class(*el, "row"))
                .collect(),
            _ => {
                let panels: Vec<_> = divs
                    .iter()
                    .copied()
                    .filter(|el| {
                        el.value()
                            .attr("class")
                            .map(|c| c.contains("productPanel"))
                            .unwrap_or(false)
                    })
                    .collect();
                if !panels.is_empty() {
                    return panels;
                }
                divs.into_iter()
                    .filter(|el| class_contains(*el, "product") || class_contains(*el, "item"))
                    .collect()
            }
        }
    }

    fn extract(&self, element: ElementRef<'_>) -> Result<ListingRecord, ExtractError> {
        let panel = ProductPanel::new(element)?;

        let year_rules: [Rule<ProductPanel<'_>, u16>; 2] =
            [
            year_from_dedicated_element as Rule<ProductPanel<'_>, u16>,
            year_from_text_nodes as Rule<ProductPanel<'_>, u16>,
        ];
        let ram_rules: [Rule<ProductPanel<'_>, SpecNumber>; 3] =
            [
            ram_from_specs as Rule<ProductPanel<'_>, SpecNumber>,
            ram_from_name as Rule<ProductPanel<'_>, SpecNumber>,
            ram_from_blurb as Rule<ProductPanel<'_>, SpecNumber>,
        ];
        let storage_rules: [Rule<ProductPanel<'_>, SpecNumber>; 3] =
            [
            storage_from_specs as Rule<ProductPanel<'_>, SpecNumber>,
            storage_from_name as Rule<ProductPanel<'_>, SpecNumber>,
            storage_from_blurb as Rule<ProductPanel<'_>, SpecNumber>,
        ];

        let mut record = ListingRecord::named(panel.name.clone());
        record.release_year = first_present(&panel, &year_rules);
        record.price = self.price(&panel);
        record.ram = first_present(&panel, &ram_rules);
        record.storage = first_present(&panel, &storage_rules);
        record.camera = panel.specs.camera;
        record.screen_size = panel.specs.screen_size;
        record.battery = panel.specs.battery;

        Ok(record)
    }
}

/// One product container with the values every rule needs
pub struct ProductPanel<'a> {
    element: ElementRef<'a>,
    name: String,
    specs: SpecSummary,
}

impl<'a> ProductPanel<'a> {
    pub fn new(element: ElementRef<'a>) -> Result<Self, ExtractError> {
        let name_rules: [Rule<ElementRef<'a>, String>; 3] = [
            name_from_product_heading as Rule<ElementRef<'a>, String>,
            name_from_any_heading as Rule<ElementRef<'a>, String>,
            name_from_named_class as Rule<ElementRef<'a>, String>,
        ];
        let name = first_present(&element, &name_rules).ok_or(ExtractError::MissingName)?;

        let specs = find_specs_container(element)
            .map(SpecSummary::from_container)
            .unwrap_or_default();

        Ok(Self {
            element,
            name,
            specs,
        })
    }
}

// ===== Name rules =====

fn non_empty(text: String) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn name_from_product_heading(element: &ElementRef<'_>) -> Option<String> {
    descendant_elements(*element)
        .find(|el| is_tag(*el, "h2") && has_class(*el, PRODUCT_NAME_CLASS))
        .and_then(|el| non_empty(text_of(el)))
}

fn name_from_any_heading(element: &ElementRef<'_>) -> Option<String> {
    descendant_elements(*element)
        .find(|el| is_tag(*el, "h2"))
        .and_then(|el| non_empty(text_of(el)))
}

fn name_from_named_class(element: &ElementRef<'_>) -> Option<String> {
    descendant_elements(*element)
        .find(|el| {
            (is_tag(*el, "h2") || is_tag(*el, "h3") || is_tag(*el, "div"))
                && (class_contains(*el, "name") || class_contains(*el, "title"))
        })
        .and_then(|el| non_empty(text_of(el)))
}

// ===== Release year rules =====

fn year_from_dedicated_element(panel: &ProductPanel<'_>) -> Option<u16> {
    let year_block = descendant_elements(panel.element)
        .find(|el| is_tag(*el, "div") && has_class(*el, YEAR_RELEASED_CLASS))?;
    let span = descendant_elements(year_block).find(|el| is_tag(*el, "span"))?;
    fields::parse_year(&text_of(span))
}

fn year_from_text_nodes(panel: &ProductPanel<'_>) -> Option<u16> {
    text_nodes(panel.element).find_map(fields::release_year)
}

// ===== Price rules =====

fn price_from_seller_links(panel: &ProductPanel<'_>) -> Option<u64> {
    descendant_elements(panel.element)
        .filter(|el| is_tag(*el, "a"))
        .filter(|el| {
            el.value()
                .attr("href")
                .map(|href| href.contains(SELLER_TRACKING_PATH))
                .unwrap_or(false)
        })
        .map(text_of)
        .filter(|text| text.contains(CURRENCY_MARKER))
        .find_map(|text| clean_price(&text))
}

fn price_from_text_nodes(panel: &ProductPanel<'_>) -> Option<u64> {
    text_nodes(panel.element)
        .filter(|text| text.contains(CURRENCY_MARKER))
        .find_map(clean_price)
}

fn price_from_table_cells(panel: &ProductPanel<'_>) -> Option<u64> {
    descendant_elements(panel.element)
        .filter(|el| is_tag(*el, "td"))
        .map(text_of)
        .filter(|text| text.contains(CURRENCY_MARKER))
        .find_map(|text| clean_price(&text))
}

fn price_from_price_class(panel: &ProductPanel<'_>) -> Option<u64> {
    descendant_elements(panel.element)
        .filter(|el| class_contains(*el, "price"))
        .map(text_of)
        .filter(|text| text.contains(CURRENCY_MARKER))
        .find_map(|text| clean_price(&text))
}

// ===== RAM / storage rules =====

fn ram_from_specs(panel: &ProductPanel<'_>) -> Option<SpecNumber> {
    panel.specs.ram
}

fn ram_from_name(panel: &ProductPanel<'_>) -> Option<SpecNumber> {
    extract_spec_value(&panel.name, &RAM_IN_NAME)
}

fn ram_from_blurb(panel: &ProductPanel<'_>) -> Option<SpecNumber> {
    extract_spec_value(&text_of(panel.element), &RAM_SUFFIXED)
}

fn storage_from_specs(panel: &ProductPanel<'_>) -> Option<SpecNumber> {
    panel.specs.storage
}

fn storage_from_name(panel: &ProductPanel<'_>) -> Option<SpecNumber> {
    extract_spec_value(&panel.name, &ROM_IN_NAME)
}

fn storage_from_blurb(panel: &ProductPanel<'_>) -> Option<SpecNumber> {
    extract_spec_value(&text_of(panel.element), &STORAGE_SUFFIXED)
}

// ===== Specs container =====

/// Locates the spec list: the dedicated class first, else any `div` whose
/// class mentions "spec" or "detail"
fn find_specs_container(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    descendant_elements(element)
        .find(|el| is_tag(*el, "div") && has_class(*el, SPECS_LIST_CLASS))
        .or_else(|| {
            descendant_elements(element).find(|el| {
                is_tag(*el, "div") && (class_contains(*el, "spec") || class_contains(*el, "detail"))
            })
        })
}

/// Values read from a spec list, one item at a time
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SpecSummary {
    pub ram: Option<SpecNumber>,
    pub storage: Option<SpecNumber>,
    pub camera: Option<u32>,
    pub screen_size: Option<f64>,
    pub battery: Option<u32>,
}

impl SpecSummary {
    /// Scans the spec items (`div`s classed `col-md-6` or `*spec*`) of a container
    pub fn from_container(container: ElementRef<'_>) -> Self {
        let mut summary = Self::default();
        for item in descendant_elements(container).filter(|el| {
            is_tag(*el, "div")
                && (el
                    .value()
                    .attr("class")
                    .map(|c| c.contains("col-md-6"))
                    .unwrap_or(false)
                    || class_contains(*el, "spec"))
        }) {
            summary.absorb(&text_of(item));
        }
        summary
    }

    /// Folds one spec item into the summary
    ///
    /// An item naming RAM fills RAM; an item naming ROM or storage fills
    /// storage; an item naming neither fills whichever of the two are still
    /// absent, RAM first. The GB token taken as RAM is never reused as storage
    /// for the same item; storage then takes the next GB token, if any.
    /// Camera, screen and battery keep their first match.
    pub fn absorb(&mut self, text: &str) {
        let upper = text.to_uppercase();
        let mentions_ram = upper.contains("RAM");
        let mentions_storage = upper.contains("ROM") || upper.contains("STORAGE");

        if text.contains("GB") {
            let mut ram_token_at = None;

            if mentions_ram || (self.ram.is_none() && !mentions_storage) {
                let token = if mentions_ram {
                    keyword_capture(text, &[&*RAM_SUFFIXED, &*RAM_IN_NAME])
                } else {
                    None
                }
                .or_else(|| first_gb_capture(text));

                if let Some(token) = token {
                    if let Some(value) = SpecNumber::parse(token.as_str()) {
                        self.ram = Some(value);
                        ram_token_at = Some(token.start());
                    }
                }
            }

            if mentions_storage || self.storage.is_none() {
                let token = if mentions_storage {
                    keyword_capture(text, &[&*STORAGE_SUFFIXED, &*ROM_IN_NAME])
                } else {
                    None
                }
                .filter(|token| ram_token_at != Some(token.start()))
                .or_else(|| gb_capture_after(text, ram_token_at));

                if let Some(token) = token {
                    if let Some(value) = SpecNumber::parse(token.as_str()) {
                        self.storage = Some(value);
                    }
                }
            }
        }

        if self.camera.is_none() && text.contains("MP") {
            self.camera = fields::camera_mp(text);
        }

        if self.screen_size.is_none() && text.contains("inch") {
            self.screen_size = fields::screen_inches(text);
        }

        if self.battery.is_none() && text.contains("mAh") {
            self.battery = fields::battery_mah(text);
        }
    }
}

fn keyword_capture<'t>(text: &'t str, patterns: &[&Regex]) -> Option<regex::Match<'t>> {
    patterns
        .iter()
        .find_map(|pattern| pattern.captures(text).and_then(|c| c.get(1)))
}

fn first_gb_capture(text: &str) -> Option<regex::Match<'_>> {
    GB_VALUE.captures(text).and_then(|c| c.get(1))
}

/// First GB token that is not the one already taken at `taken`
fn gb_capture_after(text: &str, taken: Option<usize>) -> Option<regex::Match<'_>> {
    GB_VALUE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .find(|token| Some(token.start()) != taken)
}
