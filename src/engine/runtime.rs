//! Explicit runtime routing between the browser and native tree engines.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Which tree engine a call should run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Runtime {
    /// The host page's `DOMParser`. Requires a browser-like global.
    Browser,
    /// html5ever. Must not be used from inside a browser page.
    Node,
}

impl Runtime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Runtime::Browser => "browser",
            Runtime::Node => "node",
        }
    }

    /// Fail fast if this runtime's tree engine cannot be used here.
    pub fn ensure_available(self) -> Result<()> {
        let available = match self {
            Runtime::Browser => has_browser_global(),
            Runtime::Node => !has_browser_global(),
        };
        if available {
            Ok(())
        } else {
            Err(self.mismatch())
        }
    }

    pub(crate) fn mismatch(self) -> Error {
        match self {
            Runtime::Browser => Error::EnvironmentMismatch {
                entry: "browser",
                expected: "browser",
                hint: "outside a browser page, use the node runtime instead",
            },
            Runtime::Node => Error::EnvironmentMismatch {
                entry: "node",
                expected: "non-browser",
                hint: "inside a browser page, use the browser runtime instead",
            },
        }
    }
}

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
fn has_browser_global() -> bool {
    web_sys::window().and_then(|w| w.document()).is_some()
}

#[cfg(not(all(feature = "wasm", target_arch = "wasm32")))]
fn has_browser_global() -> bool {
    false
}

impl FromStr for Runtime {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "browser" => Ok(Runtime::Browser),
            "node" => Ok(Runtime::Node),
            other => Err(Error::InvalidRuntime(other.to_string())),
        }
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_runtimes() {
        assert_eq!("browser".parse::<Runtime>().unwrap(), Runtime::Browser);
        assert_eq!("node".parse::<Runtime>().unwrap(), Runtime::Node);
        assert_eq!(Runtime::Node.to_string(), "node");
    }

    #[test]
    fn test_invalid_runtime_names_value_and_accepted_set() {
        let err = "deno".parse::<Runtime>().unwrap_err();
        let msg = err.to_string();

        assert!(matches!(err, Error::InvalidRuntime(ref v) if v == "deno"));
        assert!(msg.contains("\"deno\""));
        assert!(msg.contains("\"browser\""));
        assert!(msg.contains("\"node\""));
    }

    #[test]
    fn test_runtime_names_are_case_sensitive() {
        assert!("Node".parse::<Runtime>().is_err());
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_browser_runtime_is_unavailable_natively() {
        let err = Runtime::Browser.ensure_available().unwrap_err();

        assert!(matches!(err, Error::EnvironmentMismatch { expected: "browser", .. }));
        assert!(err.to_string().contains("node runtime"));
        assert!(Runtime::Node.ensure_available().is_ok());
    }
}
