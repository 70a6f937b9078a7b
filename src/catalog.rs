use crate::model::Product;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Category used when a detected label has no products of its own.
pub const DEFAULT_CATEGORY: &str = "default";

/// Shop-the-look products grouped by detected object category.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    categories: BTreeMap<String, Vec<Product>>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    ByCategory(BTreeMap<String, Vec<Product>>),
    Flat(Vec<Product>),
}

fn product(id: &str, name: &str, price: &str, image: &str, match_score: &str, category: &str) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        price: price.to_string(),
        image: image.to_string(),
        match_score: match_score.to_string(),
        link: None,
        category: category.to_string(),
    }
}

impl Catalog {
    /// The built-in affiliate catalog.
    pub fn builtin() -> Self {
        let mut catalog = Catalog::default();
        for p in [
            product("101", "Velvet Flow Sofa", "899€", "🛋️", "98%", "couch"),
            product("102", "Zen Modular Sofa", "1250€", "🛋️", "92%", "couch"),
            product("201", "Eames Style Chair", "129€", "🪑", "95%", "chair"),
            product("202", "Lounge Armchair", "450€", "🪑", "89%", "chair"),
            product("301", "Monstera Deliciosa", "45€", "🪴", "99%", "plant"),
            product("302", "Ficus Lyrata", "89€", "🌳", "94%", "plant"),
            product("401", "Oak Coffee Table", "249€", "🪵", "96%", "table"),
            product("501", "Smart TV 4K 55\"", "699€", "📺", "99%", "tv"),
            product("999", "Fusion Arc Lamp", "249€", "💡", "95%", DEFAULT_CATEGORY),
            product("998", "Textured Rug", "129€", "🧶", "88%", DEFAULT_CATEGORY),
        ] {
            catalog.insert(p);
        }
        catalog
    }

    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.categories.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Products for a detected label, falling back to the default category.
    pub fn suggestions_for(&self, label: &str) -> Vec<Product> {
        self.categories
            .get(label)
            .filter(|products| !products.is_empty())
            .or_else(|| self.categories.get(DEFAULT_CATEGORY))
            .cloned()
            .unwrap_or_default()
    }

    /// Add or replace a product, keyed by id.
    pub fn insert(&mut self, product: Product) {
        self.remove(&product.id);
        self.categories
            .entry(product.category.clone())
            .or_default()
            .push(product);
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let mut removed = false;
        for products in self.categories.values_mut() {
            let before = products.len();
            products.retain(|p| p.id != id);
            removed |= products.len() != before;
        }
        self.categories.retain(|_, products| !products.is_empty());
        removed
    }

    /// Merge products listed by the backend into the catalog.
    pub fn merge_remote(&mut self, products: Vec<Product>) {
        debug!(count = products.len(), "merging remote products");
        for product in products {
            self.insert(product);
        }
    }
}

/// Load the catalog, trying the configured file first.
pub fn load_catalog(path: Option<&str>) -> Catalog {
    // Search order:
    //   1) explicit path (if provided)
    //   2) ./catalog.yaml
    //   3) ~/.config/lumina/catalog.yaml
    let mut search_paths: Vec<String> = Vec::new();
    if let Some(p) = path {
        search_paths.push(p.to_string());
    }
    search_paths.push("./catalog.yaml".to_string());
    search_paths.push("~/.config/lumina/catalog.yaml".to_string());

    for candidate in search_paths {
        let expanded = shellexpand::tilde(&candidate);
        let path_obj = Path::new(expanded.as_ref());
        if !path_obj.exists() {
            continue;
        }

        match try_load_catalog_file(path_obj) {
            Ok(catalog) => return catalog,
            Err(e) => warn!("Failed to parse catalog '{}': {}", path_obj.display(), e),
        }
    }

    if let Ok(catalog) = parse_catalog_content(include_str!("../catalog.yaml")) {
        return catalog;
    }

    warn!("No catalog found; using built-in products.");
    Catalog::builtin()
}

fn try_load_catalog_file(path: &Path) -> Result<Catalog, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("read error {}: {}", path.display(), e))?;

    parse_catalog_content(&content)
}

/// Parse catalog YAML, accepting either a category map or a flat product list.
pub fn parse_catalog_content(content: &str) -> Result<Catalog, String> {
    let parsed: CatalogFile =
        serde_yaml::from_str(content).map_err(|e| format!("yaml parse error: {}", e))?;

    let mut catalog = Catalog::default();
    match parsed {
        CatalogFile::ByCategory(map) => {
            for (category, products) in map {
                for mut p in products {
                    p.category = category.clone();
                    catalog.insert(p);
                }
            }
        }
        CatalogFile::Flat(products) => catalog.merge_remote(products),
    }

    if catalog.is_empty() {
        return Err("catalog has no products".to_string());
    }
    Ok(catalog)
}
