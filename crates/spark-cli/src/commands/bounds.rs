//! Bounds inspection command

use super::{find_entity, open_scene, root_entities};
use anyhow::Result;
use spark_bounds::{BoundsCalculator, SparkBounds};

pub struct BoundsArgs {
    pub scene: String,
    pub entity: Option<String>,
    pub relative_to: Option<String>,
    pub format: String,
}

pub fn run(args: BoundsArgs) -> Result<()> {
    let world = open_scene(&args.scene)?;
    let calculator = BoundsCalculator::new();

    let frame = args
        .relative_to
        .as_deref()
        .map(|name| find_entity(&world, name))
        .transpose()?;

    let targets = match args.entity.as_deref() {
        Some(name) => vec![(name.to_string(), find_entity(&world, name)?)],
        None => root_entities(&world),
    };

    let measured: Vec<(String, SparkBounds)> = targets
        .into_iter()
        .map(|(name, entity)| {
            let bounds = match frame {
                Some(frame) => calculator.calculate_relative_to(&world, Some(entity), frame),
                None => calculator.calculate(&world, Some(entity)),
            };
            (name, bounds)
        })
        .collect();

    if args.format == "json" {
        print_json(&measured)?;
    } else {
        print_text(&measured, args.relative_to.as_deref());
    }
    Ok(())
}

fn print_text(measured: &[(String, SparkBounds)], frame: Option<&str>) {
    if measured.is_empty() {
        println!("Scene has no entities.");
        return;
    }
    if let Some(frame) = frame {
        println!("Bounds relative to '{frame}':");
    }
    for (name, b) in measured {
        if !b.is_valid {
            println!("{name}: no geometry ({})", b.target_type);
            continue;
        }
        println!("{name} [{}] from {:?}", b.target_type, b.source);
        println!("  center {:>8.3} {:>8.3} {:>8.3}", b.center.x, b.center.y, b.center.z);
        println!("  size   {:>8.3} {:>8.3} {:>8.3}", b.size.x, b.size.y, b.size.z);
        println!(
            "  axes   length={} secondary={} tertiary={}",
            axis_name(b.length_axis),
            axis_name(b.secondary_axis),
            axis_name(b.tertiary_axis)
        );
    }
}

fn print_json(measured: &[(String, SparkBounds)]) -> Result<()> {
    let entries: Vec<serde_json::Value> = measured
        .iter()
        .map(|(name, bounds)| {
            serde_json::json!({
                "entity": name,
                "bounds": bounds,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

fn axis_name(axis: usize) -> &'static str {
    match axis {
        0 => "x",
        1 => "y",
        _ => "z",
    }
}
