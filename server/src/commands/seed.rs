use std::path::Path;

use color_eyre::eyre::Context;
use color_eyre::Result;
use db::ingredients::Ingredient;
use db::setup_db_pool;
use db::tags::Tag;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct IngredientRecord {
    name: String,
    measurement_unit: String,
}

#[derive(Debug, Deserialize)]
struct TagRecord {
    name: String,
    slug: String,
}

/// Imports the catalogs from `<data_dir>/ingredients.json` and
/// `<data_dir>/tags.json`. Records already present are skipped, so the
/// command is safe to re-run.
pub(crate) async fn seed(data_dir: &Path) -> Result<()> {
    let pool = setup_db_pool().await?;

    let ingredients_path = data_dir.join("ingredients.json");
    let raw = std::fs::read_to_string(&ingredients_path)
        .wrap_err_with(|| format!("Failed to read {}", ingredients_path.display()))?;
    let records: Vec<IngredientRecord> = serde_json::from_str(&raw)
        .wrap_err_with(|| format!("Failed to parse {}", ingredients_path.display()))?;

    let mut added = 0usize;
    for record in &records {
        if Ingredient::create(&pool, &record.name, &record.measurement_unit)
            .await?
            .is_some()
        {
            added += 1;
        }
    }
    println!("ingredients: {added} added, {} skipped", records.len() - added);

    let tags_path = data_dir.join("tags.json");
    let raw = std::fs::read_to_string(&tags_path)
        .wrap_err_with(|| format!("Failed to read {}", tags_path.display()))?;
    let records: Vec<TagRecord> = serde_json::from_str(&raw)
        .wrap_err_with(|| format!("Failed to parse {}", tags_path.display()))?;

    let mut added = 0usize;
    for record in &records {
        if Tag::create(&pool, &record.name, &record.slug)
            .await?
            .is_some()
        {
            added += 1;
        }
    }
    println!("tags: {added} added, {} skipped", records.len() - added);

    Ok(())
}
