mod bootstrap;

use anyhow::Result;
use glucose_core::settings::{LastUsedParams, Settings};
use glucose_data::prepare::prepare_dataset;
use glucose_runtime::loader::DatasetLoader;
use glucose_runtime::report::DashboardReport;
use glucose_runtime::session::{FilterState, QuerySession};
use glucose_ui::app::run_dashboard;
use glucose_ui::themes::Theme;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_ref())?;

    tracing::info!("meal-glucose v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        "View: {}, Focus: {}, Groups: {}, Theme: {}",
        settings.view,
        settings.focus,
        settings.groups,
        settings.theme
    );

    match settings.view.as_str() {
        "prepare" => {
            let output_dir = settings.prepare_output_dir();
            let outcome = prepare_dataset(&settings.source_dir, &output_dir, &settings.entry)?;
            println!(
                "Merged {} meal rows from {} participants into {}",
                outcome.rows,
                outcome.participants,
                outcome.archive_path.display()
            );
            for skipped in &outcome.skipped_files {
                println!("Skipped {}", skipped.display());
            }
        }

        "summary" | "json" => {
            let focus = settings.nutrient_focus()?;
            let groups = settings.health_groups()?;
            let dataset = DatasetLoader::new(settings.archive.clone(), settings.entry.clone())
                .load()
                .await?;
            let session = QuerySession::with_filter(dataset, focus, groups)?;
            let report = DashboardReport::from_session(&session);

            if settings.view == "json" {
                println!("{}", report.to_json()?);
            } else {
                print!("{}", report.to_text());
            }
        }

        "tui" => {
            let focus = settings.nutrient_focus()?;
            let groups = settings.health_groups()?;
            let load = DatasetLoader::new(settings.archive.clone(), settings.entry.clone()).start();

            // The loop exits on 'q' / Ctrl+C inside the TUI. An OS-level
            // Ctrl+C is also honoured in case raw mode was never entered.
            tokio::select! {
                result = run_dashboard(load, Theme::from_name(&settings.theme), focus, groups) => {
                    if let Some(filter) = result? {
                        remember_filter(&settings, &filter);
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Ctrl+C received; shutting down");
                }
            }
        }

        unknown => {
            eprintln!("Unknown view mode: {}", unknown);
        }
    }

    Ok(())
}

/// Persist the filter the user left the dashboard with so the next run
/// starts from it.
fn remember_filter(settings: &Settings, filter: &FilterState) {
    let mut params = LastUsedParams::from(settings);
    params.focus = Some(filter.focus.slug().to_string());
    params.groups = Some(
        filter
            .groups
            .iter()
            .map(|g| g.slug())
            .collect::<Vec<_>>()
            .join(","),
    );
    if let Err(e) = params.save_to(&LastUsedParams::config_path()) {
        tracing::warn!("Could not save last-used parameters: {e}");
    }
}
