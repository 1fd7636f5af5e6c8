use serde::{Deserialize, Serialize};

/// One product entry scraped from a search results page.
///
/// Every field is kept as the verbatim text found on the page. Prices are not
/// parsed: they carry currency symbols and locale grouping (e.g. `"₹52,990"`).
/// A field whose source element is absent is the empty string.
///
/// Serialized key names and order match the published dataset format, so
/// `sku` is written as `"SKU"` and the rest in camelCase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ListingRecord {
    /// Catalog identifier (the container's `data-asin`).
    #[serde(rename = "SKU")]
    pub sku: String,
    pub product_name: String,
    /// Read from the same element as `product_name`; both are kept.
    pub product_title: String,
    pub description: String,
    pub category: String,
    pub mrp: String,
    pub selling_price: String,
    pub discount: String,
    pub weight: String,
    pub brand_name: String,
    pub image_url: String,
    pub laptop_specification: String,
}

impl ListingRecord {
    /// Returns `true` if no field carries any text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        [
            &self.sku,
            &self.product_name,
            &self.product_title,
            &self.description,
            &self.category,
            &self.mrp,
            &self.selling_price,
            &self.discount,
            &self.weight,
            &self.brand_name,
            &self.image_url,
            &self.laptop_specification,
        ]
        .iter()
        .all(|f| f.is_empty())
    }
}

/// Ordered, append-only collection of harvested records.
///
/// Owned by whoever drives a scrape batch. Writers only ever borrow it, so
/// saving never reorders or drops entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultSet {
    records: Vec<ListingRecord>,
}

impl ResultSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, record: ListingRecord) {
        self.records.push(record);
    }

    pub fn extend<I>(&mut self, records: I)
    where
        I: IntoIterator<Item = ListingRecord>,
    {
        self.records.extend(records);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ListingRecord> {
        self.records.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[ListingRecord] {
        &self.records
    }

    /// Drops every record, e.g. after the set has been flushed to storage.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<ListingRecord> {
        self.records
    }
}

impl From<Vec<ListingRecord>> for ResultSet {
    fn from(records: Vec<ListingRecord>) -> Self {
        Self { records }
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a ListingRecord;
    type IntoIter = std::slice::Iter<'a, ListingRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
