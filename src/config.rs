//! Environment-driven configuration.
//!
//! | Variable            | Meaning                         |
//! |---------------------|---------------------------------|
//! | `CATBOX_USER_HASH`  | account user hash (optional)    |
//! | `CATBOX_API_URL`    | Catbox endpoint override        |
//! | `LITTERBOX_API_URL` | Litterbox endpoint override     |

use crate::catbox::{Catbox, CATBOX_API_ENDPOINT};
use crate::error::Result;
use crate::litterbox::{Litterbox, LITTERBOX_API_ENDPOINT};

#[derive(Debug, Clone)]
pub struct Config {
    pub user_hash: Option<String>,
    pub catbox_endpoint: String,
    pub litterbox_endpoint: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_hash: None,
            catbox_endpoint: CATBOX_API_ENDPOINT.into(),
            litterbox_endpoint: LITTERBOX_API_ENDPOINT.into(),
        }
    }
}

impl Config {
    /// Read the process environment. Call `dotenvy::dotenv()` first to pick
    /// up a `.env` file.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();
        Self {
            user_hash: get("CATBOX_USER_HASH"),
            catbox_endpoint: get("CATBOX_API_URL").unwrap_or(defaults.catbox_endpoint),
            litterbox_endpoint: get("LITTERBOX_API_URL").unwrap_or(defaults.litterbox_endpoint),
        }
    }

    pub fn catbox(&self) -> Result<Catbox> {
        Catbox::with_endpoint(self.catbox_endpoint.clone(), self.user_hash.clone())
    }

    pub fn litterbox(&self) -> Result<Litterbox> {
        Litterbox::with_endpoint(self.litterbox_endpoint.clone())
    }
}
