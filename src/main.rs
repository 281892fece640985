mod app;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use knowledge_graph_viz::EngineConfig;
use knowledge_graph_viz::source::{DemoSource, FileSource, GraphMode, GraphSource, SnapshotRequest};

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON snapshot to explore; a generated demo graph is used when omitted.
    #[arg(long)]
    graph: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = GraphMode::Overview)]
    mode: GraphMode,
    /// Node id to center the initial snapshot on.
    #[arg(long)]
    focus: Option<String>,
    /// JSON engine configuration, applied on top of the defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, allow_negative_numbers = true)]
    charge: Option<f64>,
    #[arg(long)]
    rest_length: Option<f64>,
    #[arg(long)]
    spring: Option<f64>,
    #[arg(long)]
    seed: Option<u64>,
    #[arg(long)]
    min_zoom: Option<f64>,
    #[arg(long)]
    max_zoom: Option<f64>,
    #[arg(long, default_value_t = 24)]
    demo_students: usize,
}

impl Args {
    fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = match &self.config {
            Some(path) => read_config_file(path)?,
            None => EngineConfig::default(),
        };

        if let Some(charge) = self.charge {
            config.simulation.charge = charge;
        }
        if let Some(rest_length) = self.rest_length {
            config.simulation.rest_length = rest_length;
        }
        if let Some(spring) = self.spring {
            config.simulation.spring_constant = spring;
        }
        if let Some(seed) = self.seed {
            config.simulation.seed = seed;
        }
        if let Some(min_zoom) = self.min_zoom {
            config.viewport.min_zoom = min_zoom;
        }
        if let Some(max_zoom) = self.max_zoom {
            config.viewport.max_zoom = max_zoom;
        }

        config
            .validate()
            .context("engine configuration is invalid")?;
        Ok(config)
    }

    fn graph_source(&self, config: &EngineConfig) -> Arc<dyn GraphSource> {
        match &self.graph {
            Some(path) => Arc::new(FileSource::new(path.clone())),
            None => Arc::new(DemoSource::new(config.simulation.seed, self.demo_students)),
        }
    }

    fn request(&self) -> SnapshotRequest {
        SnapshotRequest::new(self.mode, self.focus.clone())
    }
}

fn read_config_file(path: &Path) -> Result<EngineConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse config file {}", path.display()))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = args.engine_config()?;
    let source = args.graph_source(&config);
    let request = args.request();
    tracing::info!(source = %source.describe(), ?request, "starting explorer");

    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1440.0, 920.0]),
        ..Default::default()
    };

    eframe::run_native(
        "knowledge-graph-viz",
        options,
        Box::new(move |cc| {
            Ok(Box::new(app::ExplorerApp::new(
                cc,
                source,
                config,
                request,
            )))
        }),
    )
    .map_err(|error| anyhow!("failed to run the explorer window: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        let mut argv = vec!["knowledge-graph-viz"];
        argv.extend_from_slice(args);
        Args::try_parse_from(argv).expect("arguments parse")
    }

    #[test]
    fn defaults_produce_default_config() {
        let args = parse(&[]);
        assert_eq!(args.mode, GraphMode::Overview);
        assert_eq!(args.demo_students, 24);
        assert_eq!(args.engine_config().expect("valid"), EngineConfig::default());
        assert_eq!(args.request().focus_id, None);
    }

    #[test]
    fn flags_override_defaults() {
        let args = parse(&[
            "--charge",
            "-1200",
            "--rest-length",
            "60",
            "--spring",
            "0.5",
            "--seed",
            "7",
            "--min-zoom",
            "0.5",
            "--max-zoom",
            "4",
            "--mode",
            "career",
            "--focus",
            "career-ds",
        ]);
        let config = args.engine_config().expect("valid");
        assert_eq!(config.simulation.charge, -1200.0);
        assert_eq!(config.simulation.rest_length, 60.0);
        assert_eq!(config.simulation.spring_constant, 0.5);
        assert_eq!(config.simulation.seed, 7);
        assert_eq!(config.viewport.min_zoom, 0.5);
        assert_eq!(config.viewport.max_zoom, 4.0);

        let request = args.request();
        assert_eq!(request.mode, GraphMode::Career);
        assert_eq!(request.focus_id.as_deref(), Some("career-ds"));
    }

    #[test]
    fn invalid_override_is_rejected() {
        let args = parse(&["--charge", "25"]);
        assert!(args.engine_config().is_err());

        let args = parse(&["--min-zoom", "5", "--max-zoom", "2"]);
        assert!(args.engine_config().is_err());
    }

    #[test]
    fn config_file_is_layered_under_flags() {
        let path = std::env::temp_dir().join(format!(
            "knowledge-graph-viz-config-{}.json",
            std::process::id()
        ));
        fs::write(
            &path,
            r#"{ "simulation": { "rest_length": 120.0, "seed": 3 }, "viewport": { "max_zoom": 6.0 } }"#,
        )
        .expect("write config");

        let path_arg = path.to_string_lossy().into_owned();
        let args = parse(&["--config", &path_arg, "--seed", "11"]);
        let config = args.engine_config().expect("valid");
        fs::remove_file(&path).ok();

        assert_eq!(config.simulation.rest_length, 120.0);
        assert_eq!(config.simulation.seed, 11);
        assert_eq!(config.viewport.max_zoom, 6.0);
        assert_eq!(config.render, EngineConfig::default().render);
    }

    #[test]
    fn missing_config_file_reports_path() {
        let args = parse(&["--config", "/nonexistent/knowledge-graph-viz.json"]);
        let error = args.engine_config().expect_err("missing file");
        assert!(format!("{error:#}").contains("knowledge-graph-viz.json"));
    }
}
