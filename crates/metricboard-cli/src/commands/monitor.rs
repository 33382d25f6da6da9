use std::path::Path;

use metricboard_core::read_event_log;

use crate::tui::app::{App, Feed};
use crate::tui::demo::DemoFeed;

pub fn run(file: Option<&str>, demo: bool, refresh: f64, config_path: Option<&str>) {
    let config = super::load_config(config_path);

    let feed = match file {
        Some(path) => match read_event_log(Path::new(path)) {
            Ok(events) => Feed::Replay(events.into()),
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        None => {
            if !demo {
                eprintln!("No --file given, generating demo snapshots");
            }
            Feed::Demo(DemoFeed::new(config.clone(), rand::random()))
        }
    };

    let mut app = match App::new(&config, feed, refresh) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: invalid dashboard configuration: {e}");
            std::process::exit(1);
        }
    };
    if let Err(e) = app.run() {
        eprintln!("TUI error: {e}");
        std::process::exit(1);
    }
}
