use anyhow::{anyhow, Context, Result};
use mapper::{Mapper, MappingContext};
use shared::{Category, CategoryDto, Product, ProductDto};
use std::sync::{Arc, RwLock};
use tracing::info;

use crate::profiles::CURRENCY_ITEM;

/// Service for the product catalog
#[derive(Clone)]
pub struct CatalogService {
    mapper: Arc<Mapper>,
    products: Arc<Vec<Product>>,
    categories: Arc<RwLock<Vec<Category>>>,
}

impl CatalogService {
    pub fn new(mapper: Arc<Mapper>, products: Vec<Product>, categories: Vec<Category>) -> Self {
        Self {
            mapper,
            products: Arc::new(products),
            categories: Arc::new(RwLock::new(categories)),
        }
    }

    /// Product listing with prices labelled in `currency`
    pub fn list_products(&self, currency: &str) -> Result<Vec<ProductDto>> {
        info!("Listing {} products in {}", self.products.len(), currency);

        self.products
            .iter()
            .map(|product| {
                let mut context = MappingContext::new().with_item(CURRENCY_ITEM, currency);
                self.mapper
                    .map_with_context(product, &mut context)
                    .with_context(|| format!("Failed to build view for product {}", product.id))
            })
            .collect()
    }

    pub fn list_categories(&self) -> Result<Vec<CategoryDto>> {
        info!("Listing categories");

        let categories = self
            .categories
            .read()
            .map_err(|_| anyhow!("Category store lock poisoned"))?;
        self.mapper
            .map_all::<Category, CategoryDto>(&categories)
            .context("Failed to build category views")
    }

    /// Import a category sent by a client, replacing one with the same id
    pub fn import_category(&self, dto: &CategoryDto) -> Result<Category> {
        info!("Importing category: id={}, name={}", dto.id, dto.name);

        if dto.name.trim().is_empty() {
            return Err(anyhow!("Category name cannot be empty"));
        }

        let category: Category = self
            .mapper
            .map(dto)
            .with_context(|| format!("Invalid category {}", dto.id))?;

        let mut categories = self
            .categories
            .write()
            .map_err(|_| anyhow!("Category store lock poisoned"))?;
        match categories.iter_mut().find(|existing| existing.id == category.id) {
            Some(existing) => *existing = category.clone(),
            None => categories.push(category.clone()),
        }

        Ok(category)
    }
}
