//! Cache command implementation.

use std::path::Path;

use miette::Result;

use lintgraph_cache::FsCache;
use lintgraph_core::config::Config;

use crate::cli::CacheAction;

pub fn exec(config_path: Option<&Path>, action: CacheAction) -> Result<()> {
    let config = Config::load(config_path, &[])?;
    let cache = FsCache::new(config.cache.dir.clone());

    match action {
        CacheAction::Stats => {
            println!("Analysis cache: {}", cache.root().display());
            println!("  Entries: {}", cache.entry_count());
            println!("  Size:    {}", format_size(cache.size()));
        }
        CacheAction::Clean => {
            let freed = cache.clean()?;
            println!("Cleared analysis cache ({} freed)", format_size(freed));
        }
    }
    Ok(())
}

fn format_size(bytes: u64) -> String {
    if bytes >= 1024 * 1024 * 1024 {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    } else if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}
