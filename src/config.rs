use std::{env, net::IpAddr, path::PathBuf};

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_MA_WINDOW: usize = 7;

#[derive(Debug, Clone)]
pub struct Config {
    pub data_path: PathBuf,
    pub host: IpAddr,
    pub port: u16,
    /// Moving-average window for daily reports that don't pass one.
    pub default_ma_window: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            data_path: lookup("APP_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data/state.json")),
            host: lookup("HOST")
                .and_then(|value| value.parse().ok())
                .unwrap_or(IpAddr::from([0, 0, 0, 0])),
            port: lookup("PORT")
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_PORT),
            default_ma_window: lookup("DEFAULT_MA_WINDOW")
                .and_then(|value| value.parse().ok())
                .unwrap_or(DEFAULT_MA_WINDOW),
        }
    }
}
