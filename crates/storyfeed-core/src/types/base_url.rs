//! Where a feed reads its stories from.

use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::{Host, Url};

use crate::error::{Error, InvalidInputError};

/// A story source location.
///
/// Either a live backend (`https://`, or `http://` on a loopback host) or a
/// directory of recorded captures (`file://`).
///
/// ```
/// use storyfeed_core::BaseUrl;
///
/// let live: BaseUrl = "http://127.0.0.1:8001".parse().unwrap();
/// assert_eq!(live.endpoint("analyze"), "http://127.0.0.1:8001/analyze");
///
/// let captures: BaseUrl = "file:///tmp/captures".parse().unwrap();
/// assert!(captures.is_local());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BaseUrl {
    url: Url,
}

impl BaseUrl {
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let raw = s.as_ref();
        let reject = |reason: String| -> Error {
            InvalidInputError::BaseUrl {
                value: raw.to_string(),
                reason,
            }
            .into()
        };

        let url = Url::parse(raw).map_err(|e| reject(e.to_string()))?;
        match url.scheme() {
            "file" if url.to_file_path().is_ok() => {}
            "file" => return Err(reject("not a local directory".into())),
            "https" => {}
            "http" if is_loopback(&url) => {}
            "http" => return Err(reject("plain http only for a local backend".into())),
            other => return Err(reject(format!("unsupported scheme `{other}`"))),
        }

        Ok(Self { url })
    }

    /// Absolute URL of `path` below this base, keeping any path prefix.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// True for a capture directory.
    pub fn is_local(&self) -> bool {
        self.url.scheme() == "file"
    }

    /// The capture directory, for `file://` sources.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        if !self.is_local() {
            return None;
        }
        self.url.to_file_path().ok()
    }
}

fn is_loopback(url: &Url) -> bool {
    match url.host() {
        Some(Host::Domain(name)) => name == "localhost",
        Some(Host::Ipv4(ip)) => IpAddr::V4(ip).is_loopback(),
        Some(Host::Ipv6(ip)) => IpAddr::V6(ip).is_loopback(),
        None => false,
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

impl FromStr for BaseUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for BaseUrl {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<BaseUrl> for String {
    fn from(base: BaseUrl) -> Self {
        base.url.into()
    }
}
