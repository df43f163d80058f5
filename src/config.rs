use crate::api::SOFASCORE_BASE_URL;
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;

/// Settings shared by every binary that talks to the incident feed
#[derive(Args, Debug, Clone)]
pub struct FeedConfig {
    /// Sofascore API base URL
    #[arg(long, env = "SOFASCORE_BASE_URL", default_value = SOFASCORE_BASE_URL)]
    pub base_url: String,

    /// HTTP timeout per request, in seconds
    #[arg(long, env = "FEED_TIMEOUT_SECS", default_value = "10")]
    pub timeout_secs: u64,

    /// Maximum number of fixtures fetched at once
    #[arg(long, env = "FETCH_CONCURRENCY", default_value = "4")]
    pub concurrency: usize,

    /// Directory for JSON caches and CSV exports
    #[arg(long, env = "CACHE_DIR", default_value = "cache")]
    pub cache_dir: PathBuf,

    /// Reuse cached round data when present
    #[arg(long, env = "USE_CACHE", default_value = "false")]
    pub use_cache: bool,
}

impl FeedConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.base_url.trim().is_empty() {
            anyhow::bail!("base_url must not be empty");
        }
        if self.timeout_secs == 0 {
            anyhow::bail!("timeout_secs must be positive");
        }
        if self.concurrency == 0 {
            anyhow::bail!("concurrency must be at least 1");
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        feed: FeedConfig,
    }

    #[test]
    fn test_defaults() {
        let cli = TestCli::try_parse_from(["test"]).unwrap();
        assert_eq!(cli.feed.concurrency, 4);
        assert_eq!(cli.feed.timeout(), Duration::from_secs(10));
        assert!(cli.feed.validate().is_ok());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let cli = TestCli::try_parse_from(["test", "--concurrency", "0"]).unwrap();
        assert!(cli.feed.validate().is_err());
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let cli = TestCli::try_parse_from(["test", "--base-url", " "]).unwrap();
        assert!(cli.feed.validate().is_err());
    }
}
