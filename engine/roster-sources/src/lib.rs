//! Roster acquisition
//!
//! Source adapters for the upstream player databases (Sleeper, ESPN, NFL.com,
//! Yahoo) and the acquisition chain that tries them in priority order, falling
//! back to a built-in fixture dataset when all of them fail.

pub mod chain;
pub mod config;
pub mod error;
pub mod espn;
pub mod fanout;
pub mod fixture;
pub mod mappings;
pub mod nfl;
pub mod oauth;
pub mod sleeper;
pub mod source;
pub mod transport;
pub mod types;
pub mod yahoo;

pub use chain::{Acquisition, AcquisitionChain, AttemptOutcome, SourceAttempt};
pub use config::{RetryConfig, SourcesConfig, YahooCredentials};
pub use error::{Result, SourceError};
pub use fixture::{fixture_players, FIXTURE_SOURCE};
pub use oauth::{FantasyApi, YahooOAuthClient};
pub use source::SourceAdapter;
pub use transport::{HttpTransport, JsonTransport};
pub use types::{Provenance, RawNumber, RawPlayerRecord};
