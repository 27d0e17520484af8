use std::path::PathBuf;

/// Log file read at startup, relative to the working directory.
pub const DEFAULT_DATA_PATH: &str = "E-commerce Website Logs.csv";

/// Static dashboard settings, fixed at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    /// Number of equal-width intervals for the duration chart.
    pub duration_bins: usize,
    /// How many countries the two country rankings keep.
    pub top_countries: usize,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            duration_bins: 20,
            top_countries: 10,
            window_size: [1280.0, 900.0],
            min_window_size: [720.0, 480.0],
        }
    }
}
