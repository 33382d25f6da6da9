use metricboard_core::{MetricKind, presets};

pub fn run(json: bool) {
    let cfg = presets::default_dashboard_config();

    if json {
        match cfg.to_json_pretty() {
            Ok(text) => println!("{text}"),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
        return;
    }

    println!("Built-in dashboard: {} metrics", cfg.schema.len());
    println!();
    for board in &cfg.boards {
        let count = |kind| board.metrics.values().filter(|m| m.kind == kind).count();
        println!(
            "  {:<10} event={:<24} tick=+{}  {} series, {} gauges, {} cards",
            board.name,
            board.event,
            board.tick_increment,
            count(MetricKind::Series),
            count(MetricKind::Gauge),
            count(MetricKind::Card),
        );
    }
    if let Some(event) = &cfg.worldmap_event {
        println!("  {:<10} event={event}", "worldmap");
    }

    println!();
    println!("  Metrics:");
    for key in cfg.schema.keys() {
        let kind = if presets::DURATION_METRICS.contains(&key) {
            "series"
        } else if presets::GAUGE_METRICS.contains(&key) {
            "gauge"
        } else {
            "card"
        };
        println!("    {key:<58} {kind}");
    }
}
