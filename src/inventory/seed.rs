//! Sample catalog loader.
//!
//! The catalog ships embedded as `seed/catalog.toml`. Bags name their
//! category, fabric and color; names are resolved to the freshly minted ids
//! inside a single transaction, so a bad reference leaves the store empty.

use crate::core::assets;
use crate::core::broker::DbBroker;
use crate::core::error::PlushyError;
use crate::core::store::Store;
use crate::core::time;
use crate::inventory::bag::{self, Bag};
use crate::inventory::category::{self, Category};
use crate::inventory::color::{self, Color};
use crate::inventory::fabric::{self, Fabric};
use crate::inventory::{self as inv, Summary};
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedCatalog {
    #[serde(default)]
    pub colors: Vec<SeedColor>,
    #[serde(default)]
    pub fabrics: Vec<SeedMaterial>,
    #[serde(default)]
    pub categories: Vec<SeedMaterial>,
    #[serde(default)]
    pub bags: Vec<SeedBag>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedColor {
    pub name: String,
    pub image: String,
}

/// Categories and fabrics share a shape.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedMaterial {
    pub name: String,
    pub description: String,
    pub image: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedBag {
    pub name: String,
    pub price: f64,
    pub stock: i64,
    pub category: String,
    pub fabric: String,
    pub color: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq, Eq)]
pub struct SeedReport {
    pub colors: usize,
    pub fabrics: usize,
    pub categories: usize,
    pub bags: usize,
}

pub fn parse_seed_catalog(content: &str) -> Result<SeedCatalog, PlushyError> {
    toml::from_str(content).map_err(|e| PlushyError::ValidationError(e.to_string()))
}

/// The catalog embedded in the binary.
pub fn load_seed_catalog() -> Result<SeedCatalog, PlushyError> {
    let text = assets::get_text(assets::SEED_CATALOG_PATH).ok_or_else(|| {
        PlushyError::ConfigError(format!(
            "embedded asset {} is missing",
            assets::SEED_CATALOG_PATH
        ))
    })?;
    parse_seed_catalog(&text)
}

fn resolve<'a>(
    ids: &'a FxHashMap<&str, String>,
    kind: &str,
    name: &str,
    bag: &str,
) -> Result<&'a str, PlushyError> {
    ids.get(name).map(String::as_str).ok_or_else(|| {
        PlushyError::ValidationError(format!("bag '{}' names unknown {} '{}'", bag, kind, name))
    })
}

/// Insert every record of `catalog` into an empty store.
pub fn seed_catalog(store: &Store, catalog: &SeedCatalog) -> Result<SeedReport, PlushyError> {
    let existing: Summary = inv::summary(store)?;
    if existing.total() > 0 {
        return Err(PlushyError::ValidationError(format!(
            "inventory already holds {} records; seed only runs on an empty store",
            existing.total()
        )));
    }

    let broker = DbBroker::new(store);
    let report = broker.write("inventory.seed", None, |conn| {
        let tx = conn.unchecked_transaction()?;

        let mut color_ids: FxHashMap<&str, String> = FxHashMap::default();
        for (position, seed) in catalog.colors.iter().enumerate() {
            let record = Color {
                id: time::new_record_id(),
                name: seed.name.clone(),
                image: inv::stored_image_path(&seed.image),
                display_order: position as i64,
            };
            color::insert_color(&tx, &record)?;
            color_ids.insert(seed.name.as_str(), record.id);
        }

        let mut fabric_ids: FxHashMap<&str, String> = FxHashMap::default();
        for seed in &catalog.fabrics {
            let record = Fabric {
                id: time::new_record_id(),
                name: seed.name.clone(),
                description: seed.description.clone(),
                image: inv::stored_image_path(&seed.image),
            };
            fabric::insert_fabric(&tx, &record)?;
            fabric_ids.insert(seed.name.as_str(), record.id);
        }

        let mut category_ids: FxHashMap<&str, String> = FxHashMap::default();
        for seed in &catalog.categories {
            let record = Category {
                id: time::new_record_id(),
                name: seed.name.clone(),
                description: seed.description.clone(),
                image: inv::stored_image_path(&seed.image),
            };
            category::insert_category(&tx, &record)?;
            category_ids.insert(seed.name.as_str(), record.id);
        }

        for seed in &catalog.bags {
            let record = Bag {
                id: time::new_record_id(),
                name: seed.name.clone(),
                price: seed.price,
                stock: seed.stock,
                category: resolve(&category_ids, "category", &seed.category, &seed.name)?
                    .to_string(),
                fabric: resolve(&fabric_ids, "fabric", &seed.fabric, &seed.name)?.to_string(),
                color: resolve(&color_ids, "color", &seed.color, &seed.name)?.to_string(),
            };
            bag::insert_bag(&tx, &record)?;
        }

        tx.commit()?;
        Ok(SeedReport {
            colors: catalog.colors.len(),
            fabrics: catalog.fabrics.len(),
            categories: catalog.categories.len(),
            bags: catalog.bags.len(),
        })
    })?;

    tracing::info!(
        colors = report.colors,
        fabrics = report.fabrics,
        categories = report.categories,
        bags = report.bags,
        "seeded sample catalog"
    );
    Ok(report)
}
