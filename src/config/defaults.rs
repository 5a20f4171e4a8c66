/// Configuration default values
///
/// All configuration defaults live here so the seed values are changeable
/// in one central location.
use crate::models::SourceEntry;

// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

// Response cache defaults
pub const DEFAULT_CACHE_ENABLED: bool = true;
pub const DEFAULT_CACHE_CAPACITY: usize = 256;
pub const DEFAULT_CACHE_TTL_SECS: u64 = 600;
pub const DEFAULT_CACHE_SHARED_TTL_SECS: u64 = 3600;

// Policy defaults
pub const DEFAULT_DESIGNATED_SOURCE: &str = "m3u888";
pub const DEFAULT_REWRITE_LABELS: bool = true;

/// Seed source table used when no configuration file exists yet.
pub fn default_source_table() -> Vec<SourceEntry> {
    [
        ("aktv", "https://aktv.space/live.m3u"),
        ("iptv-org", "https://iptv-org.github.io/iptv/index.m3u"),
        ("m3u888", "https://m3u888.zabc.net/get.php?type=m3u"),
        ("epg-best", "https://epg.best/live.m3u"),
        ("iptv-plus", "https://iptv-plus.net/live.m3u"),
    ]
    .into_iter()
    .map(|(key, url)| SourceEntry {
        key: key.to_string(),
        url: url.to_string(),
        enabled: true,
    })
    .collect()
}
