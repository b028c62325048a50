//! Headless effect simulation command

use super::{find_entity, open_scene};
use anyhow::{Context, Result};
use serde::Serialize;
use spark_effects::{EffectManager, EffectSummary, EffectSystem, EffectsConfig, Element};
use spark_runtime::SystemRunner;
use std::path::Path;

pub struct SimulateArgs {
    pub scene: String,
    pub target: String,
    pub element: Element,
    pub intensity: f32,
    pub frames: u32,
    pub dt: f32,
    pub seed: Option<u64>,
    pub config: Option<String>,
    pub format: String,
}

#[derive(Serialize)]
struct SimulationReport {
    target: String,
    target_type: String,
    frames_run: u32,
    seconds: f32,
    peak_light: f32,
    /// None when the effect was pruned before the run finished
    last: Option<EffectSummary>,
}

pub fn run(args: SimulateArgs) -> Result<()> {
    let config = match args.config.as_deref() {
        Some(path) => EffectsConfig::load(Path::new(path))
            .with_context(|| format!("Failed to load effects config {path}"))?,
        None => EffectsConfig::default(),
    };

    let mut world = open_scene(&args.scene)?;
    let target = find_entity(&world, &args.target)?;

    let manager = match args.seed {
        Some(seed) => EffectManager::with_seed(config, seed),
        None => EffectManager::new(config),
    };
    let system = EffectSystem::from_manager(manager);
    let effects = system.handle();
    let mut runner = SystemRunner::new();
    runner.add_system(&mut world, Box::new(system))?;

    let target_type = effects.borrow().calculator().classifier().classify(&world, target);
    let handle = effects
        .borrow_mut()
        .attach(&mut world, target, args.element, args.intensity)
        .with_context(|| format!("Could not attach {} to '{}'", args.element, args.target))?;
    tracing::info!(entity = %args.target, element = %args.element, "simulating");

    let mut report = SimulationReport {
        target: args.target.clone(),
        target_type: target_type.to_string(),
        frames_run: 0,
        seconds: 0.0,
        peak_light: 0.0,
        last: effects.borrow().summary(&world, handle),
    };

    for _ in 0..args.frames {
        runner.step(&mut world, args.dt)?;
        report.frames_run += 1;
        report.seconds = runner.clock.total_time as f32;

        let summary = effects.borrow().summary(&world, handle);
        match summary {
            Some(s) => {
                report.peak_light = report.peak_light.max(s.light_intensity);
                report.last = Some(s);
            }
            None => {
                report.last = None;
                break;
            }
        }
    }

    runner.shutdown(&mut world)?;

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_text(&report, args.element);
    }
    Ok(())
}

fn print_text(report: &SimulationReport, element: Element) {
    println!(
        "Simulated {element} on '{}' ({}) for {} frames ({:.2}s)",
        report.target, report.target_type, report.frames_run, report.seconds
    );
    let Some(last) = &report.last else {
        println!("  Effect ended early: its target or nodes went away.");
        return;
    };
    println!(
        "  intensity      {:.2} (effective {:.2})",
        last.intensity, last.effective_intensity
    );
    if element == Element::Lightning {
        println!(
            "  bolts          {} spawned, {} active at end",
            last.bolts_spawned, last.bolts_active
        );
    }
    println!(
        "  light          peak {:.2}, final {:.2}",
        report.peak_light, last.light_intensity
    );
    println!("  particles      {}", last.particles_emitted);
    println!("  nodes          {}", last.nodes);
}
