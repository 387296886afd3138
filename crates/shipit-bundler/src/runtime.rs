use std::fmt;

use serde::{Deserialize, Serialize};

/// Runtime a packaged function runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Runtime {
    Js,
    Go,
    Py,
}

impl Runtime {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Js => "js",
            Self::Go => "go",
            Self::Py => "py",
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
    fn serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Runtime::Py).unwrap(), "\"py\"");
        assert_eq!(Runtime::Go.to_string(), "go");
    }
}
