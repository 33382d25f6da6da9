pub fn run(host: &str, port: u16, config_path: Option<&str>) {
    let config = super::load_config(config_path);

    let base = format!("http://{host}:{port}");
    println!("📈 metricboard server v{}", metricboard_core::VERSION);
    println!("   {base}");
    println!("   {} boards", config.boards.len());
    println!();
    println!("   Endpoints:");
    println!("     GET  /                 API index (try: curl {base})");
    println!("     POST /events           Apply a snapshot event");
    println!("     GET  /boards/<event>   Current frames of a board");
    println!("     GET  /worldmap         Current worldmap model");
    println!("     POST /session/reset    Start a fresh session");
    println!("     GET  /health           Health check and ingest counters");
    println!();
    println!("   Events:");
    for board in &config.boards {
        println!("     {:<24} → {}", board.event, board.name);
    }
    if let Some(event) = &config.worldmap_event {
        println!("     {event:<24} → worldmap");
    }
    println!();
    println!("   Example:");
    if let Some(board) = config.boards.first() {
        let key = board.metrics.keys().next().map(String::as_str).unwrap_or("metric");
        println!(
            "     curl -X POST {base}/events -H 'content-type: application/json' \\\n       -d '{{\"event\":\"{}\",\"points\":{{\"{key}\":1.5}}}}'",
            board.event
        );
        println!("     curl {base}/boards/{}", board.event);
    }
    println!();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: cannot start runtime: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = rt.block_on(metricboard_server::run_server(&config, host, port)) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
