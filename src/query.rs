//! In-memory filtering and pagination over normalized records
//!
//! Everything here is pure and synchronous; it operates on records the query
//! layer already holds, never on the backend.

use crate::normalize::HoardingRecord;

/// Price criterion for a filter
#[derive(Debug, Clone, Default, PartialEq)]
pub enum PriceRange {
    /// No price constraint
    #[default]
    Any,
    /// Strictly below the given amount
    Below(f64),
    /// Inclusive range
    Between(f64, f64),
    /// Strictly above the given amount
    Above(f64),
}

impl PriceRange {
    fn matches(&self, price: f64) -> bool {
        match *self {
            PriceRange::Any => true,
            PriceRange::Below(max) => price < max,
            PriceRange::Between(min, max) => price >= min && price <= max,
            PriceRange::Above(min) => price > min,
        }
    }
}

/// AND-composed filter criteria over normalized records
#[derive(Debug, Clone, Default)]
pub struct Filter {
    query: Option<String>,
    size: Option<String>,
    price: PriceRange,
    available_only: bool,
    category: Option<String>,
    area: Option<String>,
}

impl Filter {
    /// Create an empty filter that matches everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive substring match against location and title
    pub fn query(mut self, text: &str) -> Self {
        self.query = Some(text.to_lowercase());
        self
    }

    /// Exact size match, e.g. "20x10"
    pub fn size(mut self, size: &str) -> Self {
        self.size = Some(size.to_string());
        self
    }

    /// Constrain the price
    pub fn price(mut self, range: PriceRange) -> Self {
        self.price = range;
        self
    }

    /// Keep only available records
    pub fn available_only(mut self, value: bool) -> Self {
        self.available_only = value;
        self
    }

    /// Exact match on the category a record was fetched under
    pub fn category(mut self, name: &str) -> Self {
        self.category = Some(name.to_string());
        self
    }

    /// Exact match on the area segment derived from the location
    pub fn area(mut self, area: &str) -> Self {
        self.area = Some(area.to_string());
        self
    }

    /// Whether a single record satisfies every criterion
    pub fn matches(&self, record: &HoardingRecord) -> bool {
        if let Some(ref q) = self.query {
            let in_location = record.location.to_lowercase().contains(q.as_str());
            let in_title = record.title.to_lowercase().contains(q.as_str());
            if !in_location && !in_title {
                return false;
            }
        }
        if let Some(ref size) = self.size {
            if record.size != *size {
                return false;
            }
        }
        if !self.price.matches(record.price) {
            return false;
        }
        if self.available_only && !record.available {
            return false;
        }
        if let Some(ref category) = self.category {
            if record.category_name != *category {
                return false;
            }
        }
        if let Some(ref area) = self.area {
            if area_of(&record.location).as_deref() != Some(area.as_str()) {
                return false;
            }
        }
        true
    }

    /// Apply the filter, returning the matching records
    pub fn apply(&self, records: &[HoardingRecord]) -> Vec<HoardingRecord> {
        records
            .iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect()
    }
}

/// Derive the area segment of a free-text address.
///
/// Addresses usually read "Street, Area, City"; the second comma segment is
/// the area, falling back to the first for short forms like
/// "Jaysingpur, Maharashtra".
pub fn area_of(location: &str) -> Option<String> {
    let parts: Vec<&str> = location.split(',').collect();
    let segment = parts.get(1).or_else(|| parts.first())?;
    let trimmed = segment.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Distinct areas across a record set, sorted (the area dropdown)
pub fn area_options(records: &[HoardingRecord]) -> Vec<String> {
    let mut areas: Vec<String> = records
        .iter()
        .filter_map(|r| area_of(&r.location))
        .collect();
    areas.sort();
    areas.dedup();
    areas
}

/// Distinct sizes across a record set, in first-seen order (the size dropdown)
pub fn size_options(records: &[HoardingRecord]) -> Vec<String> {
    let mut sizes = Vec::new();
    for record in records {
        if !record.size.is_empty() && !sizes.contains(&record.size) {
            sizes.push(record.size.clone());
        }
    }
    sizes
}

/// A visible slice of a record set
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// The records currently shown
    pub items: Vec<T>,

    /// Whether more records exist past the shown prefix
    pub has_more: bool,
}

/// Deterministic prefix pagination: show the first
/// `page_size * pages_shown` records, capped at the total.
pub fn paginate<T: Clone>(records: &[T], page_size: usize, pages_shown: usize) -> Page<T> {
    let shown = page_size.saturating_mul(pages_shown).min(records.len());
    Page {
        items: records[..shown].to_vec(),
        has_more: records.len() > shown,
    }
}
