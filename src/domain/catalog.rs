//! Product catalog
//!
//! Immutable reference data: products and the fixed category set. The only
//! mutation path is the seller-facing stock update.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{Result, StorefrontError};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: u32,
    pub name: String,
    pub category: String,
    pub price: Decimal,
    pub image_urls: Vec<String>,
    pub description: String,
    pub fabric: String,
    pub fit: String,
    pub care: Vec<String>,
    pub stock: u32,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub sizes: Vec<String>,
}

impl Product {
    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Category {
    pub id: u32,
    pub name: String,
    pub image_url: String,
}

/// Read-only after construction, except for [`Catalog::set_stock`].
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    products: Vec<Product>,
    categories: Vec<Category>,
}

impl Catalog {
    pub fn new(products: Vec<Product>, categories: Vec<Category>) -> Self {
        Self { products, categories }
    }

    pub fn all(&self) -> &[Product] {
        &self.products
    }

    pub fn get(&self, id: u32) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Case-insensitive substring match on product name or category.
    pub fn search(&self, query: &str) -> Vec<&Product> {
        let needle = query.to_lowercase();
        self.products
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.category.to_lowercase().contains(&needle)
            })
            .collect()
    }

    /// Seller-facing stock update. The shopping flow never mutates products.
    pub fn set_stock(&mut self, id: u32, stock: u32) -> Result<()> {
        let product = self
            .products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(StorefrontError::NotFound)?;
        product.stock = stock;
        Ok(())
    }
}

/// Demo catalog mirroring the brand's seed data.
pub fn seed() -> Catalog {
    let categories = vec![
        category(1, "Jackets"),
        category(2, "Sneakers"),
        category(3, "T-Shirts"),
        category(4, "Shirts"),
        category(5, "Accessories"),
        category(6, "Shoes"),
        category(7, "Jeans"),
    ];
    let products = vec![
        product(
            1,
            "Tech Runner Sneakers",
            "Sneakers",
            999,
            "Lightweight mesh upper and a responsive sole for all-day wear.",
            "80% Polyester, 20% Elastane",
            "Regular",
            &["Wipe clean with a damp cloth.", "Do not machine wash."],
            15,
            &["Black", "White"],
            &["8", "9", "10", "11"],
        ),
        product(
            2,
            "Urban Explorer Jacket",
            "Jackets",
            1299,
            "Water-resistant fabric and multiple pockets for any urban adventure.",
            "100% Nylon Shell, 100% Polyester Lining",
            "Regular",
            &["Machine wash cold.", "Tumble dry low."],
            8,
            &["Olive", "Black"],
            &["M", "L", "XL"],
        ),
        product(
            3,
            "Classic Oxford Shirt",
            "Shirts",
            599,
            "A timeless oxford weave with a button-down collar.",
            "100% Cotton",
            "Slim",
            &["Machine wash cold.", "Iron on medium heat."],
            20,
            &["White", "Blue"],
            &["S", "M", "L", "XL"],
        ),
        product(
            4,
            "Graphic T-Shirt",
            "T-Shirts",
            299,
            "Soft combed cotton with an original streetwear print.",
            "100% Combed Cotton",
            "Regular",
            &["Machine wash cold, inside out."],
            30,
            &["Black", "White", "Red"],
            &["S", "M", "L", "XL", "XXL"],
        ),
        product(
            5,
            "Leather Biker Jacket",
            "Jackets",
            1999,
            "Genuine leather with asymmetrical zips and a belted waist.",
            "100% Genuine Leather",
            "Slim",
            &["Professional leather clean only."],
            3,
            &["Black", "Brown"],
            &["M", "L"],
        ),
        product(
            7,
            "Slim Fit Jeans",
            "Jeans",
            899,
            "Stretch denim cut slim through the leg.",
            "98% Cotton, 2% Elastane",
            "Slim",
            &["Machine wash cold, inside out.", "Hang to dry."],
            12,
            &["Blue", "Black"],
            &["30", "32", "34", "36"],
        ),
        product(
            9,
            "Minimalist Leather Watch",
            "Accessories",
            999,
            "Clean dial, genuine leather strap, water resistant to 30m.",
            "Leather, Stainless Steel",
            "Adjustable",
            &["Wipe with a soft dry cloth."],
            10,
            &["Brown", "Black"],
            &[],
        ),
        product(
            13,
            "Classic White Sneakers",
            "Sneakers",
            799,
            "Minimalist white sneakers that pair with anything.",
            "Polyurethane Upper, Rubber Sole",
            "Regular",
            &["Wipe clean with a damp cloth."],
            0,
            &["White"],
            &["8", "9", "10"],
        ),
        product(
            17,
            "Striped Crew Neck Tee",
            "T-Shirts",
            299,
            "Classic breton stripes on a soft jersey knit.",
            "100% Cotton",
            "Regular",
            &["Machine wash cold with like colors.", "Hang to dry."],
            25,
            &["Blue", "White"],
            &["S", "M", "L", "XL"],
        ),
        product(
            21,
            "Canvas Backpack",
            "Accessories",
            799,
            "Durable waxed canvas with padded laptop sleeve.",
            "Waxed Cotton Canvas",
            "N/A",
            &["Spot clean only."],
            18,
            &["Olive", "Black"],
            &[],
        ),
    ];
    Catalog::new(products, categories)
}

fn category(id: u32, name: &str) -> Category {
    Category {
        id,
        name: name.to_string(),
        image_url: format!(
            "https://picsum.photos/seed/men-{}-category/600/800",
            name.to_lowercase()
        ),
    }
}

#[allow(clippy::too_many_arguments)]
fn product(
    id: u32,
    name: &str,
    cat: &str,
    price: u32,
    description: &str,
    fabric: &str,
    fit: &str,
    care: &[&str],
    stock: u32,
    colors: &[&str],
    sizes: &[&str],
) -> Product {
    Product {
        id,
        name: name.to_string(),
        category: cat.to_string(),
        price: Decimal::from(price),
        image_urls: vec![format!(
            "https://picsum.photos/seed/{}/500/700",
            name.to_lowercase().replace(' ', "-")
        )],
        description: description.to_string(),
        fabric: fabric.to_string(),
        fit: fit.to_string(),
        care: care.iter().map(|c| c.to_string()).collect(),
        stock,
        colors: colors.iter().map(|c| c.to_string()).collect(),
        sizes: sizes.iter().map(|s| s.to_string()).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_and_search() {
        let catalog = seed();
        assert!(catalog.get(1).is_some());
        assert!(catalog.get(9999).is_none());
        let hits = catalog.search("sneaker");
        assert!(hits.iter().all(|p| p.category == "Sneakers"));
        assert!(!hits.is_empty());
    }

    #[test]
    fn test_set_stock() {
        let mut catalog = seed();
        catalog.set_stock(13, 5).unwrap();
        assert!(catalog.get(13).unwrap().is_in_stock());
        assert!(catalog.set_stock(9999, 1).is_err());
    }
}
