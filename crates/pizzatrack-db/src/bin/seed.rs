//! # Seed Data Generator
//!
//! Fills an empty database with a small pizzeria: the almacén and the
//! recipe menu in both sizes.
//!
//! ## Usage
//! ```bash
//! # Seed the default database
//! cargo run -p pizzatrack-db --bin seed
//!
//! # Specify database path
//! cargo run -p pizzatrack-db --bin seed -- --db ./data/pizzatrack.db
//! ```
//!
//! Seeding is skipped when the almacén already has ingredients.

use std::collections::HashMap;
use std::env;

use pizzatrack_core::validation::{validate_new_ingredient, validate_new_recipe};
use pizzatrack_core::{IngredientId, Money, NewIngredient, NewRecipe, PizzaSize, Quantity, RecipeLine};
use pizzatrack_db::{Database, DbConfig};

/// (name, unit, stock, unit cost)
const INGREDIENTS: &[(&str, &str, &str, &str)] = &[
    ("Masa para pizza", "pieza", "60", "12.00"),
    ("Salsa de tomate", "litro", "18.5", "38.00"),
    ("Queso mozzarella", "kg", "25", "165.00"),
    ("Pepperoni", "kg", "8", "210.00"),
    ("Jamón", "kg", "12", "140.00"),
    ("Piña", "kg", "4.5", "35.00"),
    ("Champiñones", "kg", "6", "95.00"),
    ("Pimiento", "kg", "3", "42.00"),
    ("Cebolla", "kg", "10", "22.00"),
    ("Aceitunas negras", "kg", "2.25", "180.00"),
];

/// (name, mediana price, grande price, [(ingredient, mediana qty)])
///
/// A Grande uses one and a half times the Mediana's amounts.
const RECIPES: &[(&str, &str, &str, &[(&str, &str)])] = &[
    (
        "Margarita",
        "119.00",
        "169.00",
        &[("Masa para pizza", "1"), ("Salsa de tomate", "0.15"), ("Queso mozzarella", "0.2")],
    ),
    (
        "Pepperoni",
        "139.00",
        "189.00",
        &[
            ("Masa para pizza", "1"),
            ("Salsa de tomate", "0.15"),
            ("Queso mozzarella", "0.2"),
            ("Pepperoni", "0.1"),
        ],
    ),
    (
        "Hawaiana",
        "139.00",
        "189.00",
        &[
            ("Masa para pizza", "1"),
            ("Salsa de tomate", "0.15"),
            ("Queso mozzarella", "0.2"),
            ("Jamón", "0.12"),
            ("Piña", "0.1"),
        ],
    ),
    (
        "Vegetariana",
        "129.00",
        "179.00",
        &[
            ("Masa para pizza", "1"),
            ("Salsa de tomate", "0.15"),
            ("Queso mozzarella", "0.18"),
            ("Champiñones", "0.08"),
            ("Pimiento", "0.06"),
            ("Cebolla", "0.05"),
            ("Aceitunas negras", "0.03"),
        ],
    ),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = env::var("PIZZATRACK_DB_PATH").unwrap_or_else(|_| "./pizzatrack.db".to_string());

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Pizzatrack Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>    Database file path (default: ./pizzatrack.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("Pizzatrack Seed Data Generator");
    println!("==============================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;
    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.ingredients().count().await?;
    if existing > 0 {
        println!("⚠ Almacén already has {} ingredients", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    let mut ids: HashMap<&str, IngredientId> = HashMap::new();
    for (name, unit, stock, cost) in INGREDIENTS {
        let new = validate_new_ingredient(&NewIngredient {
            name: name.to_string(),
            unit_of_measure: unit.to_string(),
            stock: Quantity::parse(stock)?,
            unit_cost: Money::parse(cost)?,
        })?;
        let created = db.ingredients().insert(&new).await?;
        ids.insert(*name, created.id);
    }
    println!("✓ Inserted {} ingredients", ids.len());

    let mut recipes = 0;
    for (name, mediana_price, grande_price, lines) in RECIPES {
        for (size, price, factor) in [
            (PizzaSize::Mediana, mediana_price, 2),
            (PizzaSize::Grande, grande_price, 3),
        ] {
            let mut recipe_lines = Vec::with_capacity(lines.len());
            for (ingredient, qty) in lines.iter() {
                let ingredient_id = *ids
                    .get(ingredient)
                    .ok_or_else(|| format!("unknown ingredient in recipe {name}: {ingredient}"))?;
                let base = Quantity::parse(qty)?;
                recipe_lines.push(RecipeLine {
                    ingredient_id,
                    quantity_per_unit: Quantity::from_milli(base.milli() * factor / 2),
                });
            }

            let new = validate_new_recipe(&NewRecipe {
                name: name.to_string(),
                size,
                unit_price: Money::parse(price)?,
                lines: recipe_lines,
            })?;

            if let Err(e) = db.recipes().insert(&new).await {
                eprintln!("Failed to insert {} {}: {}", name, size, e);
                continue;
            }
            recipes += 1;
        }
    }
    println!("✓ Inserted {} recipes", recipes);

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}
