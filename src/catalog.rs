//! The plant catalog: the fixed set of identifiable plants.

use crate::models::Plant;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

/// A question needs one correct answer and three distractors.
pub const MIN_PLANTS: usize = 4;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog has {found} plants, need at least {MIN_PLANTS}")]
    TooSmall { found: usize },
    #[error("duplicate plant id: {0}")]
    DuplicateId(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Immutable, ordered collection of plants, validated at load.
#[derive(Debug, Clone)]
pub struct Catalog {
    plants: Vec<Plant>,
}

impl Catalog {
    /// Build a catalog from a plant list, validating size and id uniqueness.
    pub fn new(plants: Vec<Plant>) -> Result<Self, CatalogError> {
        if plants.len() < MIN_PLANTS {
            return Err(CatalogError::TooSmall {
                found: plants.len(),
            });
        }
        let mut seen = HashSet::new();
        for plant in &plants {
            if !seen.insert(plant.id.as_str()) {
                return Err(CatalogError::DuplicateId(plant.id.clone()));
            }
        }
        Ok(Self { plants })
    }

    /// Parse a catalog from a JSON array of plants.
    pub fn from_json_str(json: &str) -> Result<Self, CatalogError> {
        let plants: Vec<Plant> = serde_json::from_str(json)?;
        Self::new(plants)
    }

    /// Load a catalog from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// The built-in houseplant catalog.
    pub fn builtin() -> Self {
        // Validated by construction; the list below satisfies MIN_PLANTS.
        Self::new(builtin_plants()).expect("builtin catalog is valid")
    }

    pub fn len(&self) -> usize {
        self.plants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plants.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Plant> {
        self.plants.iter()
    }

    pub fn plants(&self) -> &[Plant] {
        &self.plants
    }

    /// Look up a plant by id.
    pub fn get(&self, id: &str) -> Option<&Plant> {
        self.plants.iter().find(|p| p.id == id)
    }

    /// All plants except the one with the given id.
    pub fn others(&self, id: &str) -> Vec<&Plant> {
        self.plants.iter().filter(|p| p.id != id).collect()
    }
}

fn plant(
    id: &str,
    scientific_name: &str,
    common_names: &[&str],
    mnemonic: &str,
    image_ref: &str,
) -> Plant {
    Plant {
        id: id.to_string(),
        scientific_name: scientific_name.to_string(),
        common_names: common_names.iter().map(|s| s.to_string()).collect(),
        mnemonic: mnemonic.to_string(),
        image_ref: image_ref.to_string(),
    }
}

fn builtin_plants() -> Vec<Plant> {
    vec![
        plant(
            "monstera",
            "Monstera deliciosa",
            &["Monstera", "Swiss Cheese Plant"],
            "The MONSTER took bites out of the leaves - those holes!",
            "https://images.pexels.com/photos/3125195/pexels-photo-3125195.jpeg?auto=compress&cs=tinysrgb&w=400",
        ),
        plant(
            "cymbidium",
            "Cymbidium spp.",
            &["Cymbidium Orchid"],
            "CYMBALS crashing - showy dramatic flowers like an orchestra",
            "https://images.pexels.com/photos/931177/pexels-photo-931177.jpeg?auto=compress&cs=tinysrgb&w=400",
        ),
        plant(
            "schefflera",
            "Schefflera arboricola",
            &["Umbrella Plant"],
            "A CHEF-flera holding an umbrella of ingredients",
            "https://images.pexels.com/photos/1084199/pexels-photo-1084199.jpeg?auto=compress&cs=tinysrgb&w=400",
        ),
        plant(
            "bromeliad",
            "Bromeliad sp.",
            &["Bromeliad"],
            "BRO-meliad = your bro who loves pineapples (same family!)",
            "https://images.pexels.com/photos/1022922/pexels-photo-1022922.jpeg?auto=compress&cs=tinysrgb&w=400",
        ),
        plant(
            "rhipsalis",
            "Rhipsalis crispata",
            &["Hanging Cacti"],
            "RIP-salis = ripped spaghetti hanging down",
            "https://images.pexels.com/photos/4503273/pexels-photo-4503273.jpeg?auto=compress&cs=tinysrgb&w=400",
        ),
        plant(
            "crassula",
            "Crassula ovata",
            &["Jade Plant", "Money Plant"],
            "CRA$ULA = cash = money plant with coin-shaped leaves",
            "https://images.pexels.com/photos/1903965/pexels-photo-1903965.jpeg?auto=compress&cs=tinysrgb&w=400",
        ),
        plant(
            "sansevieria",
            "Sansevieria",
            &["Mother-in-law's Tongue", "Snake Plant"],
            "San-SEVERE-ia = your mother-in-law's severe sharp tongue",
            "https://images.pexels.com/photos/2123482/pexels-photo-2123482.jpeg?auto=compress&cs=tinysrgb&w=400",
        ),
    ]
}
