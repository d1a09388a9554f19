use anyhow::Result;
use curved_screen_config::AppConfig;
use curved_screen_geometry::{max_tangent_angle, CurvedScreen, PanelMesh};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Load the config named on the command line, or the default one.
///
/// Only an explicit path can fail. A missing default config is written out so
/// it can be edited.
fn load_app_config() -> Result<AppConfig> {
    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        return curved_screen_config::load_config_from(&path);
    }

    Ok(load_default_config())
}

/// Config from the default path. Any failure falls back to built-in defaults.
fn load_default_config() -> AppConfig {
    let path = match curved_screen_config::config_path() {
        Ok(path) => path,
        Err(e) => {
            warn!(?e, "No usable config directory, using defaults");
            return AppConfig::default();
        }
    };
    if path.exists() {
        return curved_screen_config::load_config().unwrap_or_else(|e| {
            warn!(?e, "Failed to load config, using defaults");
            AppConfig::default()
        });
    }

    let config = AppConfig::default();
    if let Err(e) = curved_screen_config::save_config(&config) {
        warn!(?e, "Failed to write default config");
    }
    config
}

fn main() -> Result<()> {
    // Initialize logging. Logs go to stderr so stdout stays a clean TOML dump.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "curved_screen=info,curved_screen_geometry=info,curved_screen_config=info".into()
            }),
        )
        .init();

    info!("Curved screen generator starting");

    let config = load_app_config()?;
    let screen_config = &config.screen;
    info!(
        ?config.preset,
        segments = screen_config.segment_count,
        curve_factor = screen_config.resolved_curve_factor(),
        "Config loaded"
    );

    let screen = CurvedScreen::generate(screen_config)?;

    for segment in &screen.segments {
        let pose = &segment.pose;
        let visible = segment.faces.visible();
        debug!(
            index = pose.index,
            x = pose.position.x,
            z = pose.position.z,
            angle_deg = pose.tangent_angle.to_degrees(),
            width = pose.scale.x,
            u_start = visible.u_start(),
            u_end = visible.u_end(),
            "Segment"
        );
    }

    let mesh = PanelMesh::from_screen(&screen);
    info!(
        vertices = mesh.vertices.len(),
        indices = mesh.indices.len(),
        steepest_deg = max_tangent_angle(screen.curve_factor, screen_config.segment_count)
            .to_degrees(),
        "Screen ready"
    );

    println!("{}", toml::to_string_pretty(&screen)?);

    Ok(())
}
