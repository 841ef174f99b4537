use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// Sales route an agent is working. The set is fixed by operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RouteCode {
    #[serde(rename = "AJ01")]
    Aj01,
    #[serde(rename = "AJ03")]
    Aj03,
    #[serde(rename = "AJ07")]
    Aj07,
    #[serde(rename = "AJ08")]
    Aj08,
    #[serde(rename = "HD02")]
    Hd02,
    #[serde(rename = "SJ02")]
    Sj02,
    #[serde(rename = "SJ05")]
    Sj05,
    #[serde(rename = "SJ16")]
    Sj16,
}

impl RouteCode {
    pub const ALL: [RouteCode; 8] = [
        RouteCode::Aj01,
        RouteCode::Aj03,
        RouteCode::Aj07,
        RouteCode::Aj08,
        RouteCode::Hd02,
        RouteCode::Sj02,
        RouteCode::Sj05,
        RouteCode::Sj16,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            RouteCode::Aj01 => "AJ01",
            RouteCode::Aj03 => "AJ03",
            RouteCode::Aj07 => "AJ07",
            RouteCode::Aj08 => "AJ08",
            RouteCode::Hd02 => "HD02",
            RouteCode::Sj02 => "SJ02",
            RouteCode::Sj05 => "SJ05",
            RouteCode::Sj16 => "SJ16",
        }
    }
}

impl std::fmt::Display for RouteCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RouteCode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        RouteCode::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| CoreError::InvalidRoute(s.to_string()))
    }
}
