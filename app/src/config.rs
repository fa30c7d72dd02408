use crate::{opts::Opts, permission::Platform};

use once_cell::sync::Lazy;
use std::{env, path::PathBuf, time::Duration};

pub static LOG_FILE: Lazy<PathBuf> = Lazy::new(|| {
    env::var("XDG_RUNTIME_DIR")
        .map(|value| PathBuf::from(format!("{value}/blescan.log")))
        .unwrap_or_else(|_| PathBuf::from("/tmp/blescan.log"))
});

#[derive(Clone, Debug, PartialEq)]
pub struct ScreenConfig {
    pub platform: Platform,
    pub adapter: Option<String>,
    pub connect_timeout: Option<Duration>,
    pub json: bool,
    pub log_level: log::LevelFilter,
    pub log_file: PathBuf,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        ScreenConfig {
            platform: Platform::default(),
            adapter: None,
            connect_timeout: None,
            json: false,
            log_level: log::LevelFilter::Info,
            log_file: LOG_FILE.clone(),
        }
    }
}

impl From<&Opts> for ScreenConfig {
    fn from(opts: &Opts) -> Self {
        let log_level = if opts.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        };

        ScreenConfig {
            platform: opts.platform,
            adapter: opts.adapter.clone(),
            connect_timeout: opts.connect_timeout.map(Duration::from_secs),
            json: opts.json,
            log_level,
            ..Default::default()
        }
    }
}
