use std::path::PathBuf;

use chrono::Datelike;
use clap::Parser;

// ---------------------------------------------------------------------------
// Command line
// ---------------------------------------------------------------------------

/// Interactive dashboard for scientific-article statistics.
#[derive(Debug, Parser)]
#[command(name = "qualis-dashboard", version, about)]
pub struct Cli {
    /// Article dataset (.json, .csv or .parquet).
    #[arg(env = "QUALIS_DATA", default_value = "artigos.json")]
    pub data: PathBuf,

    /// Pin the year used by the "articles in current year" metric.
    /// Defaults to the local calendar year at the time of each refresh.
    #[arg(long, env = "QUALIS_REFERENCE_YEAR")]
    pub reference_year: Option<i32>,

    /// Print the summary of the whole dataset as JSON and exit.
    #[arg(long)]
    pub summary: bool,
}

// ---------------------------------------------------------------------------
// Resolved configuration
// ---------------------------------------------------------------------------

/// Where the "current year" comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceYear {
    /// Read the local wall clock on every recomputation.
    Clock,
    Pinned(i32),
}

impl ReferenceYear {
    pub fn resolve(self) -> i32 {
        match self {
            ReferenceYear::Clock => chrono::Local::now().year(),
            ReferenceYear::Pinned(year) => year,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub reference_year: ReferenceYear,
    /// Initial window size in points.
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
    /// Headless mode: print the summary instead of opening a window.
    pub print_summary: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("artigos.json"),
            reference_year: ReferenceYear::Clock,
            window_size: [1280.0, 900.0],
            min_window_size: [720.0, 480.0],
            print_summary: false,
        }
    }
}

impl From<Cli> for DashboardConfig {
    fn from(cli: Cli) -> Self {
        Self {
            data_path: cli.data,
            reference_year: cli
                .reference_year
                .map_or(ReferenceYear::Clock, ReferenceYear::Pinned),
            print_summary: cli.summary,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinned_reference_year_overrides_clock() {
        let cli = Cli::try_parse_from(["qualis-dashboard", "data.csv", "--reference-year", "2019"])
            .unwrap();
        let config = DashboardConfig::from(cli);
        assert_eq!(config.data_path, PathBuf::from("data.csv"));
        assert_eq!(config.reference_year, ReferenceYear::Pinned(2019));
        assert_eq!(config.reference_year.resolve(), 2019);
        assert!(!config.print_summary);
    }

    #[test]
    fn summary_flag_selects_headless_mode() {
        let cli = Cli::try_parse_from(["qualis-dashboard", "--summary"]).unwrap();
        assert!(DashboardConfig::from(cli).print_summary);
    }

    #[test]
    fn clock_reference_year_is_current_year() {
        let now = chrono::Local::now().year();
        let resolved = ReferenceYear::Clock.resolve();
        assert!(resolved == now || resolved == now + 1);
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
