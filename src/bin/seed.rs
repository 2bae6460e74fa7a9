use std::{collections::HashMap, str::FromStr};

use inventory_panel::{
    config::AppConfig,
    models::{Name, NewProduct, Price},
    services::{category_service, product_service},
    state::AppState,
    store::StoreHandle,
};
use rust_decimal::Decimal;

const CATEGORIES: [&str; 3] = ["Electronics", "Books", "Garden"];

// (name, category, price, quantity, description)
const PRODUCTS: [(&str, &str, &str, u32, Option<&str>); 4] = [
    ("USB-C Charger", "Electronics", "24.90", 12, Some("65 W, two ports")),
    ("Desk Lamp", "Electronics", "39.00", 4, None),
    ("Rust in Action", "Books", "44.99", 3, Some("Paperback")),
    ("Watering Can", "Garden", "12.50", 0, None),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let state = AppState::new(StoreHandle::lazy(&config));

    let mut ids: HashMap<String, i64> = category_service::list_categories(&state)
        .await?
        .into_iter()
        .map(|c| (c.name, c.id))
        .collect();
    for name in CATEGORIES {
        if !ids.contains_key(name) {
            let category = category_service::add_category(&state, &Name::parse(name)?).await?;
            ids.insert(category.name, category.id);
        }
    }

    let existing: Vec<String> = product_service::list_products(&state)
        .await?
        .items
        .into_iter()
        .map(|p| p.name)
        .collect();
    let mut added = 0;
    for (name, category, price, quantity, description) in PRODUCTS {
        if existing.iter().any(|p| p == name) {
            continue;
        }
        let Some(&category_id) = ids.get(category) else {
            anyhow::bail!("category {category} was not created");
        };
        let product = NewProduct {
            name: Name::parse(name)?,
            price: Price::parse(Decimal::from_str(price)?)?,
            quantity,
            description: description.map(str::to_string),
            category_id,
        };
        product_service::add_product(&state, &product).await?;
        added += 1;
    }

    println!(
        "Seed completed. {} categories, {added} new products",
        ids.len()
    );
    Ok(())
}
