#![deny(rustdoc::broken_intra_doc_links)]
#![warn(missing_docs)]
//! A [zbus](https://gitlab.freedesktop.org/dbus/zbus) client of
//! [GameMode](https://github.com/FeralInteractive/gamemode), the daemon
//! that temporarily applies performance optimisations to games.
//!
//! Applications running inside a Flatpak sandbox can't reach the daemon
//! directly; their requests go through the `org.freedesktop.portal.GameMode`
//! portal instead. The client picks the right one on every request.
//!
//! # Examples
//!
//! Request GameMode for the running process
//! ```rust,no_run
//! use gamemode_client::game_mode::GameMode;
//!
//! fn run() -> gamemode_client::Result<()> {
//!     let game_mode = GameMode::new();
//!     game_mode.request_start()?;
//!
//!     // play
//!
//!     game_mode.request_end()?;
//!     Ok(())
//! }
//! ```
//!
//! # Optional features
//!
//! | Feature | Description |
//! | ---     | ----------- |
//! | async-io | Drive zbus with `async-io` (default) |
//! | tokio | Drive zbus with `tokio` |
//! | tracing | Log the calls made and their replies with `tracing` |

/// Alias for a [`Result`] with the error type `gamemode_client::Error`.
pub type Result<T> = std::result::Result<T, Error>;

/// Functions with `-1` error returns and a per-thread last error.
pub mod client;
mod error;
/// Talk to GameMode for the calling process or another one.
pub mod game_mode;
/// The GameMode endpoints and the transport reaching them.
pub mod proxy;
pub mod sandbox;

pub use zbus;

pub use self::{
    error::Error,
    game_mode::{GameMode, Status, Target},
};

/// Check whether the application is running inside a Flatpak sandbox.
pub fn is_sandboxed() -> bool {
    use sandbox::SandboxDetector;

    sandbox::FlatpakInfo::default().is_sandboxed()
}
