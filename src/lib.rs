//! # netwatch
//!
//! Polls one or more netdata daemons and exposes selected metric dimensions,
//! plus an aggregate alarm status per host, as sensors.
//!
//! The polling core lives in `netwatch-core`; this crate is the host process
//! around it:
//!
//! - **[`config`]**: TOML settings with environment overrides, validated into
//!   [`HostSpec`]s
//! - **[`app`]**: sets hosts up, keeps their sensors, shuts them down
//! - **[`report`]**: plain-text sensor table
//! - **[`export`]**: JSON document of every sensor's state
//!
//! ## Usage
//!
//! ```bash
//! # Print a sensor table whenever a host publishes, at most every 5 seconds
//! netwatch --config netwatch.toml --report-every 5
//!
//! # Poll every host once and write the result
//! netwatch --config netwatch.toml --export sensors.json
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use netwatch::{App, Settings};
//!
//! # tokio_test::block_on(async {
//! let settings = Settings::load("netwatch.toml".as_ref()).unwrap();
//! let app = App::setup(settings.host_specs().unwrap()).await;
//! println!("{}", netwatch::report::render(&app));
//! app.shutdown().await;
//! # });
//! ```

pub mod app;
pub mod config;
pub mod export;
pub mod report;

pub use app::{App, FailedHost, HostEntry};
pub use config::{HostConfig, Settings};
pub use netwatch_core::HostSpec;
