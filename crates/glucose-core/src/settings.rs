use clap::{CommandFactory, Parser};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::error::{DashboardError, Result};
use crate::models::{parse_health_groups, HealthGroup, NutrientFocus};

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Meal-response glucose dashboard
#[derive(Parser, Debug, Clone)]
#[command(
    name = "meal-glucose",
    about = "Meal-response glucose curves and macronutrient composition by health group",
    version
)]
pub struct Settings {
    /// Zip archive holding the merged dataset
    #[arg(long, default_value = "merged_data.csv.zip")]
    pub archive: PathBuf,

    /// Name of the CSV entry inside the archive
    #[arg(long, default_value = "merged_data.csv")]
    pub entry: String,

    /// Nutrient focus to plot
    #[arg(long, default_value = "high-carb", value_parser = ["high-carb", "high-protein", "high-fat"])]
    pub focus: String,

    /// Comma-separated health groups (healthy, pre-diabetic, type2-diabetic)
    #[arg(long, default_value = "healthy,pre-diabetic,type2-diabetic")]
    pub groups: String,

    /// View mode
    #[arg(long, default_value = "tui", value_parser = ["tui", "summary", "json", "prepare"])]
    pub view: String,

    /// Directory holding bio.csv and CGMacros-*.csv (prepare view)
    #[arg(long, default_value = ".")]
    pub source_dir: PathBuf,

    /// Where the prepare view writes merged_data.csv and its archive
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Display theme
    #[arg(long, default_value = "auto", value_parser = ["light", "dark", "classic", "auto"])]
    pub theme: String,

    /// Logging level
    #[arg(long, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Log file path
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Clear saved configuration
    #[arg(long)]
    pub clear: bool,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.meal-glucose/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub focus: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub groups: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub view: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl LastUsedParams {
    /// Return the default path to the persisted config file.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
    }

    /// Return the config path rooted at `base_dir` (used for testing).
    pub fn config_path_in(base_dir: &std::path::Path) -> PathBuf {
        base_dir.join(".meal-glucose").join("last_used.json")
    }

    /// Load persisted params from an explicit path.
    /// Returns `Default` when the file is absent or cannot be parsed.
    pub fn load_from(path: &std::path::Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_default()
    }

    /// Atomically write params to an explicit path.
    pub fn save_to(&self, path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Delete the config file at an explicit path if it exists.
    pub fn clear_at(path: &std::path::Path) -> std::result::Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse CLI arguments, merge with last-used params where no explicit CLI
    /// value was provided, and persist the result.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// Full implementation – accepts args and an explicit config path so that
    /// tests can redirect to a temporary directory.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &std::path::Path,
    ) -> Self {
        let matches = Settings::command().get_matches_from(args.clone());
        let mut settings = Settings::parse_from(args);

        if settings.clear {
            let _ = LastUsedParams::clear_at(config_path);
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);
        // A hand-edited or stale file must not poison later runs.
        let last_focus = last.focus.filter(|v| is_valid_focus(v));
        let last_groups = last.groups.filter(|v| is_valid_selection(v));

        // CLI always wins. 'prepare' is a one-off and is never restored.
        if !is_arg_explicitly_set(&matches, "focus") {
            if let Some(v) = last_focus.clone() {
                settings.focus = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "groups") {
            if let Some(v) = last_groups.clone() {
                settings.groups = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "view") {
            if let Some(v) = last.view.filter(|v| v != "prepare") {
                settings.view = v;
            }
        }
        if !is_arg_explicitly_set(&matches, "theme") {
            if let Some(v) = last.theme {
                settings.theme = v;
            }
        }

        settings = Self::apply_debug(settings);

        // Rejected values keep whatever valid selection was stored before.
        let mut params = LastUsedParams::from(&settings);
        params.focus = params.focus.filter(|v| is_valid_focus(v)).or(last_focus);
        params.groups = params
            .groups
            .filter(|v| is_valid_selection(v))
            .or(last_groups);
        let _ = params.save_to(config_path);

        settings
    }

    /// `--debug` overrides the log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }

    /// Typed nutrient focus.
    pub fn nutrient_focus(&self) -> Result<NutrientFocus> {
        self.focus.parse()
    }

    /// Typed, non-empty health-group selection.
    pub fn health_groups(&self) -> Result<BTreeSet<HealthGroup>> {
        let groups = parse_health_groups(&self.groups)?;
        if groups.is_empty() {
            return Err(DashboardError::EmptySelection);
        }
        Ok(groups)
    }

    /// Directory the prepare view writes into (defaults to the source dir).
    pub fn prepare_output_dir(&self) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| self.source_dir.clone())
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            focus: Some(s.focus.clone()),
            groups: Some(s.groups.clone()),
            view: Some(s.view.clone()).filter(|v| v != "prepare"),
            theme: Some(s.theme.clone()),
        }
    }
}

fn is_valid_focus(raw: &str) -> bool {
    raw.parse::<NutrientFocus>().is_ok()
}

/// Same rule as [`Settings::health_groups`]: known names, at least one.
fn is_valid_selection(raw: &str) -> bool {
    parse_health_groups(raw).is_ok_and(|groups| !groups.is_empty())
}

/// Returns `true` when `name` was supplied explicitly on the command line
/// (not via default value or environment variable).
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn tmp_config_path(tmp: &TempDir) -> PathBuf {
        LastUsedParams::config_path_in(tmp.path())
    }

    #[test]
    fn test_last_used_params_save_load() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        let params = LastUsedParams {
            focus: Some("high-fat".to_string()),
            groups: Some("healthy".to_string()),
            view: Some("summary".to_string()),
            theme: Some("dark".to_string()),
        };
        params.save_to(&path).expect("save");

        let loaded = LastUsedParams::load_from(&path);
        assert_eq!(loaded.focus, Some("high-fat".to_string()));
        assert_eq!(loaded.groups, Some("healthy".to_string()));
        assert_eq!(loaded.view, Some("summary".to_string()));
        assert_eq!(loaded.theme, Some("dark".to_string()));
    }

    #[test]
    fn test_last_used_params_default_when_missing() {
        let tmp = TempDir::new().expect("tempdir");
        let loaded = LastUsedParams::load_from(&tmp_config_path(&tmp));
        assert!(loaded.focus.is_none());
        assert!(loaded.groups.is_none());
        assert!(loaded.view.is_none());
        assert!(loaded.theme.is_none());
    }

    #[test]
    fn test_last_used_params_corrupt_file_is_default() {
        let tmp = TempDir::new().expect("tempdir");
        let path = tmp_config_path(&tmp);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        assert!(LastUsedParams::load_from(&path).focus.is_none());
    }

    #[test]
    fn test_settings_default_values() {
        let settings = Settings::parse_from(["meal-glucose"]);

        assert_eq!(settings.archive, PathBuf::from("merged_data.csv.zip"));
        assert_eq!(settings.entry, "merged_data.csv");
        assert_eq!(settings.focus, "high-carb");
        assert_eq!(settings.groups, "healthy,pre-diabetic,type2-diabetic");
        assert_eq!(settings.view, "tui");
        assert_eq!(settings.theme, "auto");
        assert_eq!(settings.log_level, "INFO");
        assert!(settings.output_dir.is_none());
        assert!(!settings.debug);
        assert!(!settings.clear);
    }

    #[test]
    fn test_settings_typed_accessors() {
        let settings = Settings::parse_from([
            "meal-glucose",
            "--focus",
            "high-protein",
            "--groups",
            "type2-diabetic,healthy",
        ]);
        assert_eq!(settings.nutrient_focus().unwrap(), NutrientFocus::HighProtein);
        let groups: Vec<HealthGroup> = settings.health_groups().unwrap().into_iter().collect();
        assert_eq!(groups, vec![HealthGroup::Healthy, HealthGroup::Type2Diabetic]);
    }

    #[test]
    fn test_settings_empty_groups_rejected() {
        let settings = Settings::parse_from(["meal-glucose", "--groups", " , "]);
        assert!(matches!(
            settings.health_groups(),
            Err(DashboardError::EmptySelection)
        ));
    }

    #[test]
    fn test_prepare_output_dir_defaults_to_source_dir() {
        let settings = Settings::parse_from(["meal-glucose", "--source-dir", "/data/raw"]);
        assert_eq!(settings.prepare_output_dir(), PathBuf::from("/data/raw"));
    }

    #[test]
    fn test_load_with_last_used_merges_persisted_focus() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            focus: Some("high-fat".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings =
            Settings::load_with_last_used_impl(vec!["meal-glucose".into()], &config_path);
        assert_eq!(settings.focus, "high-fat");
    }

    #[test]
    fn test_load_with_last_used_cli_overrides_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("dark".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings = Settings::load_with_last_used_impl(
            vec!["meal-glucose".into(), "--theme".into(), "light".into()],
            &config_path,
        );
        assert_eq!(settings.theme, "light");
    }

    #[test]
    fn test_load_with_last_used_rejected_groups_not_persisted() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        let first = Settings::load_with_last_used_impl(
            vec!["meal-glucose".into(), "--groups".into(), "".into()],
            &config_path,
        );
        assert!(matches!(
            first.health_groups(),
            Err(DashboardError::EmptySelection)
        ));
        assert!(LastUsedParams::load_from(&config_path).groups.is_none());

        let second =
            Settings::load_with_last_used_impl(vec!["meal-glucose".into()], &config_path);
        assert_eq!(second.groups, "healthy,pre-diabetic,type2-diabetic");
        assert_eq!(second.health_groups().unwrap().len(), 3);
    }

    #[test]
    fn test_load_with_last_used_rejected_groups_keep_previous_selection() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(
            vec!["meal-glucose".into(), "--groups".into(), "healthy".into()],
            &config_path,
        );
        let rejected = Settings::load_with_last_used_impl(
            vec!["meal-glucose".into(), "--groups".into(), "healthy,bogus".into()],
            &config_path,
        );
        assert!(matches!(
            rejected.health_groups(),
            Err(DashboardError::InvalidHealthGroup(_))
        ));

        let next =
            Settings::load_with_last_used_impl(vec!["meal-glucose".into()], &config_path);
        assert_eq!(next.groups, "healthy");
        assert!(next.health_groups().is_ok());
    }

    #[test]
    fn test_load_with_last_used_ignores_invalid_persisted_values() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            focus: Some("high-sugar".to_string()),
            groups: Some("bogus".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        let settings =
            Settings::load_with_last_used_impl(vec!["meal-glucose".into()], &config_path);
        assert_eq!(settings.nutrient_focus().unwrap(), NutrientFocus::HighCarb);
        assert_eq!(settings.health_groups().unwrap().len(), 3);

        let saved = LastUsedParams::load_from(&config_path);
        assert_eq!(saved.focus, Some("high-carb".to_string()));
        assert_eq!(saved.groups, Some("healthy,pre-diabetic,type2-diabetic".to_string()));
    }

    #[test]
    fn test_load_with_last_used_does_not_persist_prepare() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);

        Settings::load_with_last_used_impl(
            vec!["meal-glucose".into(), "--view".into(), "prepare".into()],
            &config_path,
        );
        assert!(LastUsedParams::load_from(&config_path).view.is_none());

        let settings =
            Settings::load_with_last_used_impl(vec!["meal-glucose".into()], &config_path);
        assert_eq!(settings.view, "tui");
    }

    #[test]
    fn test_load_with_last_used_clear_removes_file() {
        let tmp = TempDir::new().expect("tempdir");
        let config_path = tmp_config_path(&tmp);
        LastUsedParams {
            theme: Some("classic".to_string()),
            ..Default::default()
        }
        .save_to(&config_path)
        .expect("save");

        Settings::load_with_last_used_impl(
            vec!["meal-glucose".into(), "--clear".into()],
            &config_path,
        );

        assert!(!config_path.exists(), "file must be gone after --clear");
    }

    #[test]
    fn test_load_with_last_used_debug_overrides_log_level() {
        let tmp = TempDir::new().expect("tempdir");
        let settings = Settings::load_with_last_used_impl(
            vec!["meal-glucose".into(), "--debug".into()],
            &tmp_config_path(&tmp),
        );
        assert_eq!(settings.log_level, "DEBUG");
    }
}
