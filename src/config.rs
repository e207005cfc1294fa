use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use directories::ProjectDirs;

use crate::domain::entities::product::PRODUCT_SEARCH_FIELDS;
use crate::domain::view::paginate::DEFAULT_ITEMS_PER_PAGE;

pub const DB_PATH_ENV: &str = "STOCKFLOW_DB_PATH";
pub const PAGE_SIZE_ENV: &str = "STOCKFLOW_PAGE_SIZE";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub items_per_page: usize,
    pub search_fields: Vec<String>,
}

impl AppConfig {
    fn with_db_path(db_path: PathBuf) -> Self {
        Self {
            db_path,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            search_fields: PRODUCT_SEARCH_FIELDS.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Platform data directory plus environment overrides.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok(), project_dirs().ok())
    }

    pub fn from_lookup<F>(lookup: F, dirs: Option<ProjectDirs>) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = match lookup(DB_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            Some(path) => PathBuf::from(path),
            None => {
                let dirs = dirs.ok_or_else(|| anyhow!("unable to resolve data directory"))?;
                default_db_path(dirs.data_local_dir())
            }
        };

        let mut config = Self::with_db_path(db_path);
        if let Some(raw) = lookup(PAGE_SIZE_ENV) {
            config.items_per_page = parse_page_size(&raw)
                .with_context(|| format!("invalid {PAGE_SIZE_ENV} override"))?;
        }
        Ok(config)
    }

    pub fn search_fields(&self) -> Vec<&str> {
        self.search_fields.iter().map(String::as_str).collect()
    }
}

pub fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("com", "stockflow", "stockflow")
        .ok_or_else(|| anyhow!("unable to resolve data directory"))
}

pub fn default_db_path(data_dir: &Path) -> PathBuf {
    data_dir.join("stockflow.sqlite")
}

fn parse_page_size(raw: &str) -> Result<usize> {
    let size: usize = raw
        .trim()
        .parse()
        .with_context(|| format!("not a number: {raw:?}"))?;
    if size == 0 {
        bail!("page size must be at least 1");
    }
    Ok(size)
}

/// WebView profile directory under the app's data dir.
pub fn ensure_webview_data_dir(base_data_dir: &Path) -> Result<PathBuf> {
    let webview_data_dir = base_data_dir.join("webview2");
    std::fs::create_dir_all(&webview_data_dir).with_context(|| {
        format!(
            "failed to create webview dir: {}",
            webview_data_dir.display()
        )
    })?;
    Ok(webview_data_dir)
}
