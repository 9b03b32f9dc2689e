//! Reference data served to the waitstaff and kitchen.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A dish on the menu.
///
/// The aliases match the field names used by the external menu service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenuItem {
    /// Code stored on orders.
    #[serde(alias = "codigo")]
    pub code: String,
    /// Display name.
    #[serde(alias = "nombre")]
    pub name: String,
    /// Ingredients used by the dish.
    #[serde(default, alias = "ingredientes")]
    pub ingredients: Vec<String>,
}

impl MenuItem {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            ingredients: Vec::new(),
        }
    }

    pub fn with_ingredients(mut self, ingredients: &[&str]) -> Self {
        self.ingredients = ingredients.iter().map(|i| i.to_string()).collect();
        self
    }
}

/// A dining table as reported by the table service.
///
/// The aliases match the field names used by the external table service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiningTable {
    #[serde(alias = "numero", alias = "id")]
    pub number: u32,
    #[serde(default, alias = "capacidad", skip_serializing_if = "Option::is_none")]
    pub seats: Option<u32>,
    #[serde(default = "default_status", alias = "estado")]
    pub status: String,
}

fn default_status() -> String {
    "available".to_string()
}

impl DiningTable {
    pub fn available(number: u32) -> Self {
        Self {
            number,
            seats: None,
            status: default_status(),
        }
    }

    /// Returns true if the table can take a new order.
    pub fn is_available(&self) -> bool {
        let status = self.status.trim();
        status.eq_ignore_ascii_case("available") || status.eq_ignore_ascii_case("disponible")
    }
}

/// Ingredient name to quantity in stock.
pub type Inventory = BTreeMap<String, u32>;

/// A listing as returned by the external services: either a bare array or a
/// paginated `{"results": [...]}` page.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Page { results: Vec<T> },
    Bare(Vec<T>),
}

impl<T> Listing<T> {
    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Page { results } => results,
            Listing::Bare(items) => items,
        }
    }
}

/// Display name for a dish code.
///
/// Unknown codes are shown as-is and blank codes as `-`.
pub fn dish_name<'a>(code: &'a str, menu: &'a [MenuItem]) -> &'a str {
    if code.trim().is_empty() {
        return "-";
    }
    menu.iter()
        .find(|item| item.code == code)
        .map(|item| item.name.as_str())
        .unwrap_or(code)
}

/// Demo menu used when no menu is configured.
pub fn demo_menu() -> Vec<MenuItem> {
    vec![
        MenuItem::new("BEEF_BURGER", "Beef burger").with_ingredients(&["bread", "beef", "lettuce"]),
        MenuItem::new("CHICKEN_BURGER", "Chicken burger")
            .with_ingredients(&["bread", "chicken", "lettuce"]),
        MenuItem::new("BEEF_NOODLES", "Noodles with beef").with_ingredients(&["noodles", "beef"]),
        MenuItem::new("CHICKEN_NOODLES", "Noodles with chicken")
            .with_ingredients(&["noodles", "chicken"]),
        MenuItem::new("SALAD", "Classic salad").with_ingredients(&["lettuce"]),
        MenuItem::new("HOTDOG", "Hot dog").with_ingredients(&["bread"]),
    ]
}

/// Demo inventory used when no inventory is configured.
pub fn demo_inventory() -> Inventory {
    [
        ("bread", 200),
        ("beef", 120),
        ("chicken", 110),
        ("lettuce", 160),
        ("noodles", 180),
        ("tomato", 150),
        ("cheese", 140),
        ("onion", 130),
        ("mayonnaise", 100),
        ("ketchup", 100),
        ("mustard", 90),
        ("cucumber", 90),
        ("chili", 80),
        ("potatoes", 200),
        ("rice", 200),
    ]
    .into_iter()
    .map(|(name, qty)| (name.to_string(), qty))
    .collect()
}
