//! Zones command - compute the exclusion zone for one view and export it.

use std::path::PathBuf;

use zonemap::export::feature_collection;
use zonemap::session::MapSession;
use zonemap::Category;

use super::common::{layer_summary, resolve_viewport, zone_summary};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the zones command.
pub struct ZonesArgs {
    pub view: String,
    pub input: Option<PathBuf>,
    pub hide: Vec<Category>,
    pub output: Option<PathBuf>,
}

/// Run the zones command.
pub fn run(args: ZonesArgs) -> Result<(), CliError> {
    let runner = CliRunner::new()?;
    runner.log_startup("zones");
    let config = runner.config();

    let viewport = resolve_viewport(&args.view, config)?;
    let source = runner.entity_source(args.input.as_deref())?;

    let (geojson, summary) = runner.block_on(async {
        let mut session =
            MapSession::new(source, config.marker_builder(), config.session_config());
        for category in &args.hide {
            session.set_visible(*category, false);
        }

        let hash = session.move_to(viewport);
        if let Some(notice) = skipped_fetch_notice(viewport.zoom, session.config().min_zoom) {
            eprintln!("{}", notice);
        }
        session.settle().await;

        let zone = session.zone();
        let geojson = feature_collection(session.layers(), &zone).to_string();
        let mut summary = vec![format!("{} ({} markers)", hash, session.layers().len())];
        summary.extend(layer_summary(session.layers()));
        summary.push(zone_summary(&zone));
        (geojson, summary)
    });

    match &args.output {
        Some(path) => {
            std::fs::write(path, &geojson).map_err(|source| CliError::Output {
                path: path.clone(),
                source,
            })?;
            eprintln!("Wrote {}", path.display());
        }
        None => println!("{}", geojson),
    }
    for line in summary {
        eprintln!("{}", line);
    }

    Ok(())
}

/// Message for a view too far out to fetch, `None` when the fetch ran.
fn skipped_fetch_notice(zoom: u8, min_zoom: u8) -> Option<String> {
    (zoom < min_zoom).then(|| {
        format!(
            "Zoom {} is below the minimum of {}; no data fetched.",
            zoom, min_zoom
        )
    })
}
