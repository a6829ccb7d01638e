//! Codec options.
//!
//! Behaviour switches are passed explicitly to the functions that honour
//! them; there is no process-wide options table.

use serde::{Deserialize, Serialize};

/// Switches that change how messages are printed and decoded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    /// Pretty-print long rdata (SOA, DNSKEY, RRSIG) across parenthesised
    /// lines.
    pub multiline: bool,

    /// Emit a `trace!` event for every compression pointer read or written.
    pub verbose_compression: bool,
}

impl Options {
    /// Returns the default options.
    pub const fn new() -> Self {
        Self {
            multiline: false,
            verbose_compression: false,
        }
    }

    /// Enables multi-line rdata output.
    #[must_use]
    pub const fn with_multiline(mut self, multiline: bool) -> Self {
        self.multiline = multiline;
        self
    }

    /// Enables compression tracing.
    #[must_use]
    pub const fn with_verbose_compression(mut self, verbose: bool) -> Self {
        self.verbose_compression = verbose;
        self
    }
}
