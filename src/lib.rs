//! Resolve and fetch platform-specific release binaries for GitHub projects.
//!
//! [`resolve::find_asset`] picks exactly one download for an OS/architecture
//! pair and [`extract::extract`] pulls the named binary out of whatever
//! archive it came in.

pub mod config;
pub mod download;
pub mod extract;
pub mod format;
pub mod github;
pub mod platform;
pub mod registry;
pub mod resolve;
pub mod template;
pub mod types;


pub use extract::{extract, ExtractError};
pub use github::{GitHubClient, GitHubError, ReleaseApi};
pub use platform::{find_platform, PlatformError};
pub use resolve::{find_asset, ResolveError};
pub use types::{Asset, RegisteredAsset};
