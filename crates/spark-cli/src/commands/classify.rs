//! Classification listing command

use super::open_scene;
use anyhow::Result;
use spark_bounds::Classifier;

pub fn run(scene: &str, format: &str) -> Result<()> {
    let world = open_scene(scene)?;
    let classifier = Classifier::new();

    let mut rows: Vec<(String, String, Option<String>)> = world
        .entities()
        .into_iter()
        .map(|e| {
            let name = world.name(e).unwrap_or_default();
            let parent = world.parent(e).and_then(|p| world.name(p));
            (name, classifier.classify(&world, e).to_string(), parent)
        })
        .collect();
    rows.sort();

    if format == "json" {
        let entries: Vec<serde_json::Value> = rows
            .iter()
            .map(|(name, target_type, parent)| {
                serde_json::json!({
                    "entity": name,
                    "target_type": target_type,
                    "parent": parent,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    let width = rows.iter().map(|r| r.0.len()).max().unwrap_or(0);
    for (name, target_type, parent) in &rows {
        match parent {
            Some(parent) => println!("{name:<width$}  {target_type:<12}  (child of {parent})"),
            None => println!("{name:<width$}  {target_type}"),
        }
    }
    Ok(())
}
