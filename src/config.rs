use std::{fs, path::{Path, PathBuf}};

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::parsing::Identifier;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("config file {path:?} is not valid: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("config has no items to check")]
    NoItems,
    #[error("sleep_seconds can't be negative (got {0})")]
    NegativeSleep(f64),
}

/// On-disk shape of the config. `items` maps either a bare market hash name
/// or a full listing URL to the recorded buy price; IndexMap keeps the
/// file's ordering. A duplicated key keeps its last value, JSON-style.
#[derive(Debug, Deserialize)]
struct RawConfig {
    appid: u32,
    currency: u32,
    output_file: PathBuf,
    #[serde(default = "default_sleep_seconds")]
    sleep_seconds: f64,
    items: IndexMap<String, f64>,
}

fn default_sleep_seconds() -> f64 {
    3.0
}

#[derive(Debug, Clone)]
pub struct TrackedItem {
    pub link: String,
    pub name: String,
    pub buy_price: f64,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub appid: u32,
    pub currency: u32,
    pub output_file: PathBuf,
    pub sleep_seconds: f64,
    pub items: Vec<TrackedItem>,
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let raw_text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let raw: RawConfig = serde_json::from_str(&raw_text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if raw.items.is_empty() {
        return Err(ConfigError::NoItems);
    }
    if raw.sleep_seconds < 0.0 {
        return Err(ConfigError::NegativeSleep(raw.sleep_seconds));
    }

    let items = raw
        .items
        .into_iter()
        .map(|(identifier, buy_price)| {
            let (link, name) = Identifier::from_raw(&identifier).resolve(raw.appid);
            TrackedItem {
                link,
                name,
                buy_price,
            }
        })
        .collect();

    Ok(Config {
        appid: raw.appid,
        currency: raw.currency,
        output_file: raw.output_file,
        sleep_seconds: raw.sleep_seconds,
        items,
    })
}
