//! # Product Catalog
//!
//! Study-note bundles offered by the shop.
//! Products are loaded from `config/products.toml`.

use crate::money::{Currency, Price};
use serde::{Deserialize, Serialize};

/// Query string appended to sample PDFs so the embedded viewer hides its chrome
pub const SAMPLE_VIEWER_FLAGS: &str = "#toolbar=0&navpanes=0&scrollbar=0";

/// A product in the catalog
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product identifier (e.g., "1", "pack")
    pub id: String,

    /// Display title
    pub title: String,

    /// Short description
    #[serde(default)]
    pub description: String,

    /// Price
    pub price: Price,

    /// Price before discount, shown struck through
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Price>,

    /// Highlighted as the most popular offer
    #[serde(default)]
    pub is_popular: bool,

    /// Location of a sample PDF
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_url: Option<String>,

    /// Whether this product is active and available for purchase
    #[serde(default = "default_true")]
    pub active: bool,
}

fn default_true() -> bool {
    true
}

impl Product {
    /// Create a new product
    pub fn new(id: impl Into<String>, title: impl Into<String>, price: Price) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            price,
            original_price: None,
            is_popular: false,
            sample_url: None,
            active: true,
        }
    }

    /// Builder: set description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Builder: set the pre-discount price
    pub fn with_original_price(mut self, price: Price) -> Self {
        self.original_price = Some(price);
        self
    }

    /// Builder: mark as popular
    pub fn popular(mut self) -> Self {
        self.is_popular = true;
        self
    }

    /// Builder: set sample URL
    pub fn with_sample(mut self, url: impl Into<String>) -> Self {
        self.sample_url = Some(url.into());
        self
    }

    /// URL for the sample preview dialog, with viewer flags applied
    pub fn sample_preview_url(&self) -> Option<String> {
        self.sample_url
            .as_ref()
            .map(|url| format!("{}{}", url, SAMPLE_VIEWER_FLAGS))
    }

    /// Savings against the original price, if discounted
    pub fn discount(&self) -> Option<Price> {
        self.original_price
            .filter(|orig| orig.currency == self.price.currency && orig.amount > self.price.amount)
            .map(|orig| Price::from_cents(orig.amount - self.price.amount, self.price.currency))
    }
}

/// Product catalog (loaded from config)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductCatalog {
    #[serde(default)]
    pub products: Vec<Product>,
}

impl ProductCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self {
            products: Vec::new(),
        }
    }

    /// Add a product to the catalog
    pub fn add(&mut self, product: Product) {
        self.products.push(product);
    }

    /// Find a product by ID
    pub fn get(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// Get all active products
    pub fn active_products(&self) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(|p| p.active)
    }

    /// Number of products
    pub fn len(&self) -> usize {
        self.products.len()
    }

    /// Check if the catalog is empty
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Load catalog from TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// Built-in catalog of the study blocks, used when no config file exists
    pub fn study_blocks() -> Self {
        let block = |id: &str, title: &str, desc: &str, sample: &str| {
            Product::new(id, title, Price::new(20.0, Currency::EUR))
                .with_description(desc)
                .with_sample(sample)
        };

        let mut catalog = Self::new();
        catalog.add(block(
            "1",
            "Block 1: Official Statistical Production",
            "Official statistics and the production cycle of statistical operations.",
            "/samples/produccion.pdf",
        ));
        catalog.add(block(
            "2",
            "Block 2: Statistical Inference and Modelling",
            "Estimation, hypothesis testing and statistical models.",
            "/samples/inferencia.pdf",
        ));
        catalog.add(block(
            "3",
            "Block 3: Law",
            "Legal framework and regulation of statistical production.",
            "/samples/derecho.pdf",
        ));
        catalog.add(block(
            "4",
            "Block 4: National Accounts",
            "National accounting and economic analysis through the accounts.",
            "/samples/cuentas.pdf",
        ));
        catalog.add(block(
            "5",
            "Block 5: Data Storage and Data Models",
            "Databases and data models used in modern statistics.",
            "/samples/informatica.pdf",
        ));
        catalog.add(block(
            "6",
            "Block 6: Demography",
            "Population studies and demographic analysis.",
            "/samples/demografia.pdf",
        ));
        catalog.add(
            Product::new(
                "pack",
                "Common Block Pack (6 Blocks)",
                Price::new(100.0, Currency::EUR),
            )
            .with_description("All six blocks with summaries, outlines and worked cases.")
            .with_original_price(Price::new(120.0, Currency::EUR))
            .popular()
            .with_sample("/samples/pack.pdf"),
        );
        catalog
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_preview_url() {
        let product = Product::new("1", "Block 1", Price::new(20.0, Currency::EUR))
            .with_sample("/samples/produccion.pdf");

        assert_eq!(
            product.sample_preview_url().as_deref(),
            Some("/samples/produccion.pdf#toolbar=0&navpanes=0&scrollbar=0")
        );

        let bare = Product::new("2", "Block 2", Price::new(20.0, Currency::EUR));
        assert!(bare.sample_preview_url().is_none());
    }

    #[test]
    fn test_pack_discount() {
        let catalog = ProductCatalog::study_blocks();
        let pack = catalog.get("pack").unwrap();

        assert!(pack.is_popular);
        assert_eq!(pack.discount().unwrap().amount, 2000);
        assert!(catalog.get("1").unwrap().discount().is_none());
        assert_eq!(catalog.active_products().count(), 7);
    }

    #[test]
    fn test_catalog_from_toml() {
        let toml_str = r#"
            [[products]]
            id = "1"
            title = "Block 1"
            price = { amount = 2000, currency = "eur" }
            sampleUrl = "/samples/one.pdf"

            [[products]]
            id = "old"
            title = "Retired"
            price = { amount = 500 }
            active = false
        "#;

        let catalog = ProductCatalog::from_toml(toml_str).unwrap();
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("1").unwrap().price.amount, 2000);
        assert_eq!(catalog.get("old").unwrap().price.currency, Currency::EUR);
        assert_eq!(catalog.active_products().count(), 1);
    }
}
