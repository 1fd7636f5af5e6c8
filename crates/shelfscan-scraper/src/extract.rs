//! Per-container field extraction.
//!
//! Each of the twelve listing fields is a scoped lookup against one listing
//! container. A lookup that finds nothing yields `None`, which becomes the
//! empty string. A lookup that *fails* aborts the whole container: the unit
//! of failure isolation is the element, never a single field, so a record is
//! either complete (with possibly-empty fields) or not emitted at all.

use scraper::{ElementRef, Selector};
use shelfscan_core::ListingRecord;

use crate::error::{ExtractError, ScraperError};

/// A listing field, in serialized order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Sku,
    ProductName,
    ProductTitle,
    Description,
    Category,
    Mrp,
    SellingPrice,
    Discount,
    Weight,
    BrandName,
    ImageUrl,
    LaptopSpecification,
}

impl Field {
    fn slot(self, record: &mut ListingRecord) -> &mut String {
        match self {
            Field::Sku => &mut record.sku,
            Field::ProductName => &mut record.product_name,
            Field::ProductTitle => &mut record.product_title,
            Field::Description => &mut record.description,
            Field::Category => &mut record.category,
            Field::Mrp => &mut record.mrp,
            Field::SellingPrice => &mut record.selling_price,
            Field::Discount => &mut record.discount,
            Field::Weight => &mut record.weight,
            Field::BrandName => &mut record.brand_name,
            Field::ImageUrl => &mut record.image_url,
            Field::LaptopSpecification => &mut record.laptop_specification,
        }
    }
}

/// Where a field's value comes from, relative to the listing container.
enum Source {
    /// Attribute on the container itself.
    ContainerAttr(&'static str),
    /// Rendered text of the first descendant matching the selector.
    Text(&'static str),
    /// Attribute of the first descendant matching the selector.
    Attr(&'static str, &'static str),
}

// `productName` and `productTitle` intentionally share `h2 span`. So do the
// nested price selectors and the bare `.a-offscreen` used for `discount`:
// the first offscreen price in a card is what the storefront exposes there.
const FIELD_SOURCES: [(Field, Source); 12] = [
    (Field::Sku, Source::ContainerAttr("data-asin")),
    (Field::ProductName, Source::Text("h2 span")),
    (Field::ProductTitle, Source::Text("h2 span")),
    (Field::Description, Source::Text(".a-size-base")),
    (Field::Category, Source::Text(".a-link-normal")),
    (Field::Mrp, Source::Text(".a-text-price .a-offscreen")),
    (Field::SellingPrice, Source::Text(".a-price .a-offscreen")),
    (Field::Discount, Source::Text(".a-offscreen")),
    (Field::Weight, Source::Text(".a-text-bold span")),
    (Field::BrandName, Source::Text(".a-text-bold")),
    (Field::ImageUrl, Source::Attr(".s-image", "src")),
    (
        Field::LaptopSpecification,
        Source::Text(".a-unordered-list"),
    ),
];

/// A compiled, container-scoped CSS query.
#[derive(Debug, Clone)]
pub struct FieldQuery {
    css: &'static str,
    selector: Selector,
}

impl FieldQuery {
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if `css` does not parse.
    pub fn compile(css: &'static str) -> Result<Self, ScraperError> {
        let selector = Selector::parse(css).map_err(|e| ScraperError::InvalidSelector {
            selector: css.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self { css, selector })
    }

    #[must_use]
    pub fn css(&self) -> &'static str {
        self.css
    }

    #[must_use]
    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}

/// DOM-like handle for one listing container.
///
/// Every lookup is scoped to the container's descendants. `Ok(None)` means
/// "nothing matched"; `Err` means the element could not be read at all.
pub trait ListingElement {
    fn attr(&self, name: &str) -> Result<Option<String>, ExtractError>;

    fn query_text(&self, query: &FieldQuery) -> Result<Option<String>, ExtractError>;

    fn query_attr(&self, query: &FieldQuery, name: &str) -> Result<Option<String>, ExtractError>;
}

impl ListingElement for ElementRef<'_> {
    fn attr(&self, name: &str) -> Result<Option<String>, ExtractError> {
        Ok(self.value().attr(name).map(str::to_owned))
    }

    fn query_text(&self, query: &FieldQuery) -> Result<Option<String>, ExtractError> {
        Ok(self.select(query.selector()).next().map(rendered_text))
    }

    fn query_attr(&self, query: &FieldQuery, name: &str) -> Result<Option<String>, ExtractError> {
        Ok(self
            .select(query.selector())
            .next()
            .and_then(|el| el.value().attr(name).map(str::to_owned)))
    }
}

/// Elements whose content is never rendered as text.
const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that start and end on their own line.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li",
    "main", "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

/// Approximates the element's rendered text: whitespace runs collapse to a
/// single space within a line, block-level children and `<br>` break lines,
/// and script or style content is left out.
fn rendered_text(element: ElementRef<'_>) -> String {
    let mut raw = String::new();
    push_rendered(element, &mut raw);
    raw.split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_rendered(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.extend(text.chars().map(|c| if c == '\n' { ' ' } else { c }));
            continue;
        }
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };
        let name = child.value().name();
        if HIDDEN_ELEMENTS.contains(&name) {
            continue;
        }
        if name == "br" {
            out.push('\n');
            continue;
        }
        let block = BLOCK_ELEMENTS.contains(&name);
        if block {
            out.push('\n');
        }
        push_rendered(child, out);
        if block {
            out.push('\n');
        }
    }
}

enum Lookup {
    ContainerAttr(&'static str),
    Text(FieldQuery),
    Attr(FieldQuery, &'static str),
}

/// Turns one listing container into a [`ListingRecord`].
#[derive(Debug)]
pub struct FieldExtractor {
    lookups: Vec<(Field, Lookup)>,
}

impl std::fmt::Debug for Lookup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Lookup::ContainerAttr(name) => write!(f, "[{name}]"),
            Lookup::Text(q) => write!(f, "text({})", q.css()),
            Lookup::Attr(q, name) => write!(f, "{}[{name}]", q.css()),
        }
    }
}

impl FieldExtractor {
    /// Compiles the field selectors.
    ///
    /// # Errors
    ///
    /// Returns [`ScraperError::InvalidSelector`] if a selector does not parse.
    pub fn new() -> Result<Self, ScraperError> {
        let lookups = FIELD_SOURCES
            .into_iter()
            .map(|(field, source)| {
                let lookup = match source {
                    Source::ContainerAttr(name) => Lookup::ContainerAttr(name),
                    Source::Text(css) => Lookup::Text(FieldQuery::compile(css)?),
                    Source::Attr(css, name) => Lookup::Attr(FieldQuery::compile(css)?, name),
                };
                Ok::<_, ScraperError>((field, lookup))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { lookups })
    }

    /// Extracts every field from `element`.
    ///
    /// Absent sources become empty strings.
    ///
    /// # Errors
    ///
    /// Returns the first [`ExtractError`] raised by the element; no partial
    /// record is produced in that case.
    pub fn extract<E>(&self, element: &E) -> Result<ListingRecord, ExtractError>
    where
        E: ListingElement + ?Sized,
    {
        let mut record = ListingRecord::default();
        for (field, lookup) in &self.lookups {
            let value = match lookup {
                Lookup::ContainerAttr(name) => element.attr(name)?,
                Lookup::Text(query) => element.query_text(query)?,
                Lookup::Attr(query, name) => element.query_attr(query, name)?,
            };
            *field.slot(&mut record) = value.unwrap_or_default();
        }
        Ok(record)
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
