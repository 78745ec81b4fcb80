//! Catalog filter and sort engine
//!
//! A [`FilterSpec`] narrows the catalog along independent dimensions that
//! AND together; within one dimension membership is an OR. The spec persists
//! across sessions, price bounds separately from the set filters.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::catalog::{Catalog, Product};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    /// Catalog's natural order: product id ascending.
    #[default]
    Featured,
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
    StockDesc,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

impl Default for PriceRange {
    fn default() -> Self {
        Self {
            min: Decimal::ZERO,
            max: Decimal::from(10_000),
        }
    }
}

impl PriceRange {
    /// Catalog-derived defaults: floor/ceil to the nearest 100.
    pub fn from_catalog(catalog: &Catalog) -> Self {
        let prices: Vec<Decimal> = catalog.all().iter().map(|p| p.price).collect();
        let (Some(&min), Some(&max)) = (prices.iter().min(), prices.iter().max()) else {
            return Self::default();
        };
        let hundred = Decimal::from(100);
        Self {
            min: (min / hundred).floor() * hundred,
            max: (max / hundred).ceil() * hundred,
        }
    }

    /// Clamps so `min <= max` always holds; moving one bound past the other
    /// drags the other bound along.
    pub fn set_min(&mut self, min: Decimal) {
        self.min = min;
        if self.min > self.max {
            self.max = self.min;
        }
    }

    pub fn set_max(&mut self, max: Decimal) {
        self.max = max;
        if self.max < self.min {
            self.min = self.max;
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub category: Vec<String>,
    pub color: Vec<String>,
    pub size: Vec<String>,
    pub fabric: Vec<String>,
    pub fit: Vec<String>,
    #[serde(skip)]
    pub price: PriceRange,
    pub sort: SortKey,
}

impl FilterSpec {
    /// Toggles a value in one of the set dimensions.
    pub fn toggle(set: &mut Vec<String>, value: &str) {
        if let Some(pos) = set.iter().position(|v| v == value) {
            set.remove(pos);
        } else {
            set.push(value.to_string());
        }
    }

    pub fn active_count(&self, defaults: PriceRange) -> usize {
        let price_active = self.price.min > defaults.min || self.price.max < defaults.max;
        self.category.len()
            + self.color.len()
            + self.size.len()
            + self.fabric.len()
            + self.fit.len()
            + usize::from(price_active)
    }

    fn matches(&self, p: &Product) -> bool {
        if !self.category.is_empty() && !self.category.contains(&p.category) {
            return false;
        }
        if !self.color.is_empty() && !p.colors.iter().any(|c| self.color.contains(c)) {
            return false;
        }
        if !self.size.is_empty() && !p.sizes.iter().any(|s| self.size.contains(s)) {
            return false;
        }
        if !self.fabric.is_empty() && !self.fabric.contains(&p.fabric) {
            return false;
        }
        if !self.fit.is_empty() && !self.fit.contains(&p.fit) {
            return false;
        }
        p.price >= self.price.min && p.price <= self.price.max
    }
}

/// Filters then sorts. Every filter dimension ANDs in; the sort is stable and
/// total, so an empty result is valid and never an error.
pub fn apply(catalog: &Catalog, spec: &FilterSpec) -> Vec<Product> {
    let mut products: Vec<Product> = catalog
        .all()
        .iter()
        .filter(|p| spec.matches(p))
        .cloned()
        .collect();
    match spec.sort {
        SortKey::Featured => products.sort_by_key(|p| p.id),
        SortKey::NameAsc => products.sort_by(|a, b| a.name.cmp(&b.name)),
        SortKey::NameDesc => products.sort_by(|a, b| b.name.cmp(&a.name)),
        SortKey::PriceAsc => products.sort_by(|a, b| a.price.cmp(&b.price)),
        SortKey::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price)),
        SortKey::StockDesc => products.sort_by(|a, b| b.stock.cmp(&a.stock)),
    }
    products
}
