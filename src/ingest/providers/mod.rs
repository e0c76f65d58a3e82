pub mod binance_cms;
pub mod html_page;
pub mod rss_feed;

use chrono::{DateTime, Utc};

/// Display format shared by every extractor that knows a timestamp.
pub(crate) fn format_date(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d %H:%M UTC").to_string()
}
