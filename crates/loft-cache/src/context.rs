use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use dirs_next::home_dir;

/// How long a connection waits on a locked database before failing.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_millis(500);

/// How long a cached service-metadata snapshot counts as fresh.
pub const DEFAULT_METADATA_TTL: Duration = Duration::from_secs(60);

/// Process-wide cache configuration, passed explicitly to every component
/// rather than read from ambient state.
#[derive(Debug, Clone)]
pub struct CacheContext {
    cache_dir: PathBuf,
    busy_timeout: Duration,
    metadata_ttl: Duration,
}

impl CacheContext {
    #[must_use]
    pub fn new(cache_dir: PathBuf, busy_timeout: Duration, metadata_ttl: Duration) -> Self {
        Self {
            cache_dir,
            busy_timeout,
            metadata_ttl,
        }
    }

    /// Context with the default busy timeout and metadata TTL.
    #[must_use]
    pub fn with_defaults(cache_dir: PathBuf) -> Self {
        Self::new(cache_dir, DEFAULT_BUSY_TIMEOUT, DEFAULT_METADATA_TTL)
    }

    #[must_use]
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    #[must_use]
    pub fn busy_timeout(&self) -> Duration {
        self.busy_timeout
    }

    #[must_use]
    pub fn metadata_ttl(&self) -> Duration {
        self.metadata_ttl
    }
}

/// Determine the default root directory for the on-disk cache.
///
/// # Errors
///
/// Returns an error if no home directory can be resolved and no override is
/// set.
pub fn resolve_default_cache_dir() -> Result<PathBuf> {
    if let Some(override_path) = env::var_os("LOFT_CACHE_PATH") {
        return absolutize(PathBuf::from(override_path));
    }
    let home = home_dir().context("failed to resolve HOME for the loft cache")?;
    Ok(home.join(".loft").join("cache"))
}

fn absolutize(path: PathBuf) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path)
    } else {
        Ok(env::current_dir()
            .context("failed to resolve LOFT_CACHE_PATH")?
            .join(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_cache_dir_is_home_relative() -> Result<()> {
        if env::var_os("LOFT_CACHE_PATH").is_some() {
            eprintln!("skipping default_cache_dir_is_home_relative (LOFT_CACHE_PATH is set)");
            return Ok(());
        }
        let home = home_dir().context("home directory not found")?;
        assert_eq!(
            resolve_default_cache_dir()?,
            home.join(".loft").join("cache")
        );
        Ok(())
    }

    #[test]
    fn context_carries_configured_durations() {
        let context = CacheContext::new(
            PathBuf::from("/tmp/loft"),
            Duration::from_millis(250),
            Duration::from_secs(30),
        );
        assert_eq!(context.cache_dir(), Path::new("/tmp/loft"));
        assert_eq!(context.busy_timeout(), Duration::from_millis(250));
        assert_eq!(context.metadata_ttl(), Duration::from_secs(30));
    }
}
