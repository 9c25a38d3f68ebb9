use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use strum::Display;

/// Tag carried by a conversion request and its completion
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Issues monotonically increasing tokens; only the latest one is current.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: u64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a token that supersedes every earlier one
    pub fn issue(&mut self) -> RequestToken {
        self.latest += 1;
        RequestToken(self.latest)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.latest
    }
}

/// Where a raw JSON document came from. Decides the wording of parse errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Pasted,
    File(PathBuf),
    Stdin,
}

impl fmt::Display for InputSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pasted => write!(f, "pasted text"),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Stdin => write!(f, "stdin"),
        }
    }
}

/// Server export routes. Both answer with spreadsheet bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
pub enum ExportEndpoint {
    #[strum(to_string = "/download")]
    Download,
    #[strum(to_string = "/download-csv")]
    DownloadCsv,
}

impl ExportEndpoint {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Download => "/download",
            Self::DownloadCsv => "/download-csv",
        }
    }
}
