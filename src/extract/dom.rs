//! Small traversal helpers over `scraper` elements

use scraper::{ElementRef, Selector};

/// Builds a selector from a literal known to be valid
///
/// Returns `None` rather than panicking so a typo degrades to "no match".
pub fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Collapsed, trimmed text content of an element
pub fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Text content of an element with only the outer whitespace trimmed
pub fn trimmed_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed, non-empty text nodes below an element, in document order
pub fn text_nodes<'a>(element: ElementRef<'a>) -> impl Iterator<Item = &'a str> + 'a {
    element.text().map(str::trim).filter(|t| !t.is_empty())
}

/// Element descendants, excluding the element itself
pub fn descendant_elements<'a>(element: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> + 'a {
    element.descendants().skip(1).filter_map(ElementRef::wrap)
}

/// Whether any class of the element contains `needle` (ASCII case-insensitive)
pub fn class_contains(element: ElementRef<'_>, needle: &str) -> bool {
    let needle = needle.to_ascii_lowercase();
    element
        .value()
        .classes()
        .any(|class| class.to_ascii_lowercase().contains(&needle))
}

/// Whether the element carries exactly this class
pub fn has_class(element: ElementRef<'_>, class: &str) -> bool {
    element.value().classes().any(|c| c == class)
}

pub fn is_tag(element: ElementRef<'_>, tag: &str) -> bool {
    element.value().name().eq_ignore_ascii_case(tag)
}

/// First element of the given tag that follows `element` in document order,
/// skipping the element's own subtree
pub fn next_element_after<'a>(element: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    let mut cursor = Some(*element);

    while let Some(node) = cursor {
        for sibling in node.next_siblings() {
            let found = sibling
                .descendants()
                .filter_map(ElementRef::wrap)
                .find(|candidate| is_tag(*candidate, tag));
            if found.is_some() {
                return found;
            }
        }
        cursor = node.parent();
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn first<'a>(document: &'a Html, css: &str) -> ElementRef<'a> {
        document.select(&selector(css).unwrap()).next().unwrap()
    }

    #[test]
    fn test_text_of_collapses_whitespace() {
        let document = Html::parse_fragment("<div>  Galaxy\n   <b>S24</b>  Ultra </div>");
        assert_eq!(text_of(first(&document, "div")), "Galaxy S24 Ultra");
    }

    #[test]
    fn test_class_matching() {
        let document = Html::parse_fragment(r#"<div class="row styles_PriceTag__x1">x</div>"#);
        let div = first(&document, "div");
        assert!(class_contains(div, "price"));
        assert!(has_class(div, "row"));
        assert!(!has_class(div, "ro"));
        assert!(!class_contains(div, "spec"));
    }

    #[test]
    fn test_next_element_after_crosses_parents() {
        let html = r#"
            <section><div><h2>Phone A</h2></div></section>
            <p>filler</p>
            <div><a href="/a">first link</a></div>
            <a href="/b">second link</a>
        "#;
        let document = Html::parse_fragment(html);
        let heading = first(&document, "h2");
        let link = next_element_after(heading, "a").unwrap();
        assert_eq!(text_of(link), "first link");
    }

    #[test]
    fn test_next_element_after_skips_own_subtree_and_earlier_nodes() {
        let html = r#"<a href="/before">before</a><h2>Phone <a href="/inner">inner</a></h2>"#;
        let document = Html::parse_fragment(html);
        let heading = first(&document, "h2");
        assert!(next_element_after(heading, "a").is_none());
    }
}
