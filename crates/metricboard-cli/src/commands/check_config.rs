use std::path::Path;

use metricboard_core::load_dashboard_config;

pub fn run(path: &str) {
    let cfg = match load_dashboard_config(Path::new(path)) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("✗ {e}");
            std::process::exit(1);
        }
    };

    println!("✓ {path}");
    println!("  {} metrics in schema", cfg.schema.len());
    for board in &cfg.boards {
        println!(
            "  board {:<12} ← {:<24} {} widgets, tick +{}",
            board.name,
            board.event,
            board.metrics.len(),
            board.tick_increment
        );
    }
    match &cfg.worldmap_event {
        Some(event) => println!("  worldmap           ← {event}"),
        None => println!("  no worldmap"),
    }
}
