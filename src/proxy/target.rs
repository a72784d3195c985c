//! Proxy target construction
//!
//! Maps an API path (plus query string) onto the upstream URL it is relayed
//! to. Nothing here touches the network: a [`ProxyTarget`] is a pure
//! description derived from the request, so every rule is unit-testable.

use std::fmt;

use url::{form_urlencoded, Url};

use crate::config::UpstreamConfig;

pub const HISTORY_PREFIX: &str = "/api/fund/history/";
pub const SNAPSHOT_PREFIX: &str = "/api/fund/";
pub const DETAIL_PREFIX: &str = "/api/detail/";
pub const SEARCH_PATH: &str = "/api/search";

pub const DEFAULT_HISTORY_DAYS: u32 = 120;
pub const MIN_HISTORY_DAYS: u32 = 60;
pub const MAX_HISTORY_DAYS: u32 = 365;

const HISTORY_DEVICE_ID: &str = "00000000-0000-0000-0000-000000000000";

/// A six-digit fund code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundCode(String);

impl FundCode {
    /// Accepts exactly six ASCII digits
    pub fn parse(raw: &str) -> Option<Self> {
        (raw.len() == 6 && raw.bytes().all(|b| b.is_ascii_digit())).then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FundCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Upstream resource a request is relayed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyTarget {
    /// Intraday estimate (JSONP)
    Snapshot { code: FundCode },
    /// Historical net values, `days` already clamped
    History { code: FundCode, days: u32 },
    /// Fund profile
    Detail { code: FundCode },
    /// Fund search by keyword
    Search { key: String },
}

impl ProxyTarget {
    /// Match an API path against the proxy routes
    ///
    /// Returns `None` for anything that is not a well-formed proxy request;
    /// the caller then treats the path as a static file.
    pub fn match_route(path: &str, query: Option<&str>, extended_routes: bool) -> Option<Self> {
        if path.starts_with(HISTORY_PREFIX) {
            let code = FundCode::parse(last_segment(path))?;
            let days = history_days(query_param(query, "days").as_deref());
            return Some(Self::History { code, days });
        }

        if path.starts_with(SNAPSHOT_PREFIX) {
            let code = FundCode::parse(last_segment(path))?;
            return Some(Self::Snapshot { code });
        }

        if !extended_routes {
            return None;
        }

        if path.starts_with(DETAIL_PREFIX) {
            let code = FundCode::parse(last_segment(path))?;
            return Some(Self::Detail { code });
        }

        if path == SEARCH_PATH {
            let key = query_param(query, "key").filter(|k| !k.trim().is_empty())?;
            return Some(Self::Search { key });
        }

        None
    }

    /// Short route name used in logs
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Snapshot { .. } => "snapshot",
            Self::History { .. } => "history",
            Self::Detail { .. } => "detail",
            Self::Search { .. } => "search",
        }
    }

    /// Fully-formed upstream URL
    pub fn url(&self, upstream: &UpstreamConfig) -> Result<Url, url::ParseError> {
        match self {
            Self::Snapshot { code } => Url::parse(&format!(
                "{}/{code}.js",
                upstream.snapshot_endpoint.trim_end_matches('/')
            )),
            Self::History { code, days } => {
                let mut url = Url::parse(&upstream.history_endpoint)?;
                url.query_pairs_mut()
                    .append_pair("FCODE", code.as_str())
                    .append_pair("pageIndex", "1")
                    .append_pair("pageSize", &days.to_string())
                    .append_pair("appType", "ttjj")
                    .append_pair("product", "EFund")
                    .append_pair("plat", "Iphone")
                    .append_pair("version", "6.3.8")
                    .append_pair("deviceid", HISTORY_DEVICE_ID);
                Ok(url)
            }
            Self::Detail { code } => Url::parse(&format!(
                "{}/{code}",
                upstream.detail_endpoint.trim_end_matches('/')
            )),
            Self::Search { key } => {
                let mut url = Url::parse(&upstream.search_endpoint)?;
                url.query_pairs_mut()
                    .append_pair("m", "1")
                    .append_pair("key", key)
                    .append_pair("type", "all");
                Ok(url)
            }
        }
    }
}

/// Effective history page size for a raw `days` parameter
///
/// Absent, unparseable or non-positive values give the default; anything
/// else is clamped to `[MIN_HISTORY_DAYS, MAX_HISTORY_DAYS]`.
pub fn history_days(raw: Option<&str>) -> u32 {
    match raw.and_then(parse_leading_int) {
        Some(days) if days > 0 => {
            let clamped = days.clamp(i64::from(MIN_HISTORY_DAYS), i64::from(MAX_HISTORY_DAYS));
            u32::try_from(clamped).unwrap_or(MAX_HISTORY_DAYS)
        }
        _ => DEFAULT_HISTORY_DAYS,
    }
}

/// Lenient integer parse: optional sign, leading digits, trailing text ignored
fn parse_leading_int(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    // digits only, so the sole failure is overflow
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

fn last_segment(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or_default()
}

/// First value of a query parameter, percent-decoded
fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    form_urlencoded::parse(query?.as_bytes())
        .find(|(k, _)| k == name)
        .map(|(_, v)| v.into_owned())
}
