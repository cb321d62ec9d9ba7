use std::time::Duration;

use crate::media::AutoplayPolicy;

pub const DEFAULT_ENDPOINT: &str = "https://api.lolimi.cn/API/xjj/xjj.php";

pub const DEFAULT_POSTER: &str = "https://space.coze.cn/api/coze_space/gen_image?image_size=landscape_16_9&prompt=Video%20player%20placeholder%20image&sign=d7d86b987b9780d7540f246f8d5dfba1";

/// Compiled-in settings for the panel.
#[derive(Debug, Clone)]
pub struct Config {
    pub endpoint: String,
    pub poster_url: String,
    pub autoplay: AutoplayPolicy,
    pub toast_lifetime: Duration,
    /// UI loop silence after which the watchdog warns.
    pub watchdog_warn: Duration,
    /// UI loop silence after which the watchdog reports a stall.
    pub watchdog_stall: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            poster_url: DEFAULT_POSTER.to_string(),
            autoplay: AutoplayPolicy::Allowed,
            toast_lifetime: Duration::from_secs(4),
            watchdog_warn: Duration::from_secs(2),
            watchdog_stall: Duration::from_secs(5),
        }
    }
}
