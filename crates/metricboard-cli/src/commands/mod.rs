pub mod check_config;
pub mod monitor;
pub mod presets;
pub mod replay;
pub mod server;

use std::path::Path;

use metricboard_core::{ConfigLoadError, DashboardConfig, MetricPayload, load_dashboard_config};

/// Metric prefix shared by every node metric; dropped from labels.
const NODE_PREFIX: &str = "archethic_";

/// Load a dashboard config from `path`, or the built-in preset when no path is
/// given.
pub fn try_load_config(path: Option<&str>) -> Result<DashboardConfig, ConfigLoadError> {
    match path {
        Some(p) => load_dashboard_config(Path::new(p)),
        None => Ok(metricboard_core::presets::default_dashboard_config()),
    }
}

/// Like [`try_load_config`], but reports the failure and exits.
pub fn load_config(path: Option<&str>) -> DashboardConfig {
    match try_load_config(path) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

/// Short display label for a metric key.
pub fn metric_label(key: &str) -> &str {
    key.strip_prefix(NODE_PREFIX).unwrap_or(key)
}

/// One-line summary of a render payload.
pub fn describe_payload(payload: &MetricPayload) -> String {
    match payload {
        MetricPayload::Series { xs, ys } => match (xs.last(), ys.last()) {
            (Some(x), Some(y)) => format!("series  x={x:<6} y={y:.3}  ({} pts)", ys.len()),
            _ => "series  (empty)".to_string(),
        },
        MetricPayload::Gauge { value, min, max } => {
            format!("gauge   {value:.3}  [{min:.1}, {max:.1}]")
        }
        MetricPayload::Card { value } => format!("card    {}", format_value(*value)),
    }
}

/// Compact human form for card values, which range from run-queue lengths to
/// memory byte counts.
pub fn format_value(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e9 {
        format!("{:.2}G", value / 1e9)
    } else if abs >= 1e6 {
        format!("{:.2}M", value / 1e6)
    } else if abs >= 1e4 {
        format!("{:.1}k", value / 1e3)
    } else if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // -----------------------------------------------------------------------
    // config loading
    // -----------------------------------------------------------------------

    #[test]
    fn test_no_path_uses_preset() {
        let cfg = try_load_config(None).unwrap();
        assert_eq!(cfg, metricboard_core::presets::default_dashboard_config());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = try_load_config(Some("/definitely/not/here.json")).unwrap_err();
        assert!(matches!(err, ConfigLoadError::Io { .. }));
    }

    #[test]
    fn test_loads_file() {
        let cfg = metricboard_core::presets::default_dashboard_config();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(cfg.to_json_pretty().unwrap().as_bytes())
            .unwrap();
        let path = file.path().to_str().unwrap();
        assert_eq!(try_load_config(Some(path)).unwrap(), cfg);
    }

    // -----------------------------------------------------------------------
    // formatting
    // -----------------------------------------------------------------------

    #[test]
    fn test_metric_label_strips_prefix() {
        assert_eq!(metric_label("archethic_db_duration"), "db_duration");
        assert_eq!(metric_label("vm_memory_total"), "vm_memory_total");
    }

    #[test]
    fn test_format_value_scales() {
        assert_eq!(format_value(3.0), "3");
        assert_eq!(format_value(2.5), "2.50");
        assert_eq!(format_value(25_000.0), "25.0k");
        assert_eq!(format_value(3_500_000.0), "3.50M");
        assert_eq!(format_value(1_200_000_000.0), "1.20G");
    }

    #[test]
    fn test_describe_payload() {
        let gauge = MetricPayload::Gauge {
            value: 2.0,
            min: 0.0,
            max: 7.0,
        };
        assert_eq!(describe_payload(&gauge), "gauge   2.000  [0.0, 7.0]");
        let card = MetricPayload::Card { value: 42.0 };
        assert_eq!(describe_payload(&card), "card    42");
        let empty = MetricPayload::Series {
            xs: vec![],
            ys: vec![],
        };
        assert_eq!(describe_payload(&empty), "series  (empty)");
    }
}
