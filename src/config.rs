use std::path::PathBuf;

use clap::Parser;

use crate::geo::Coordinate;

/// Explore crowdsourced nearby experiences on a terminal map
#[derive(Parser, Debug, Clone)]
#[command(name = "local-lens", version, about)]
pub struct Config {
    /// Document store file holding the experiences collection
    #[arg(long, env = "LOCAL_LENS_STORE", default_value = "local-lens-db.json")]
    pub store: PathBuf,

    /// Device-local key-value file holding the itinerary
    #[arg(long, env = "LOCAL_LENS_ITINERARY", default_value = "local-lens-storage.json")]
    pub itinerary: PathBuf,

    /// Directory with Natural Earth GeoJSON basemap files
    #[arg(long, env = "LOCAL_LENS_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// Signed-in user name; omit to browse signed out
    #[arg(long, env = "LOCAL_LENS_USER")]
    pub user: Option<String>,

    /// Current position as LAT,LNG; omit to use the fallback location
    #[arg(long, env = "LOCAL_LENS_HERE", value_parser = parse_here)]
    pub here: Option<Coordinate>,

    /// Log file (the terminal belongs to the UI)
    #[arg(long, env = "LOCAL_LENS_LOG", default_value = "local-lens.log")]
    pub log_file: PathBuf,
}

fn parse_here(s: &str) -> Result<Coordinate, String> {
    Coordinate::parse_pair(s).ok_or_else(|| format!("expected LAT,LNG, got {s:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["local-lens"]).unwrap();
        assert_eq!(config.store, PathBuf::from("local-lens-db.json"));
        assert_eq!(config.user, None);
    }

    #[test]
    fn test_here_parsed() {
        let config =
            Config::try_parse_from(["local-lens", "--here", "12.97,77.59", "--user", "asha"]).unwrap();
        assert_eq!(config.here, Some(Coordinate::new(12.97, 77.59)));
        assert_eq!(config.user.as_deref(), Some("asha"));
    }

    #[test]
    fn test_bad_here_rejected() {
        assert!(Config::try_parse_from(["local-lens", "--here", "north"]).is_err());
    }
}
