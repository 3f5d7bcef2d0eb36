// osenv: Process Environment Access
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!            get / set / unset / snapshot
//!                        |
//!          ,---------------------------,
//!          |            env            |
//!          |  validate -> lock -> call |
//!          '-----+---------------+-----'
//!                |               |
//!                v               v
//!            windows           posix
//!     GetEnvironmentVariableW  getenv
//!     SetEnvironmentVariableW  setenv / unsetenv
//!     GetEnvironmentStringsW   environ
//!                |               |
//!                +-------+-------+
//!                        v
//!   +-----------------------------------------+
//!   |  foundation   error (EnvError, code())  |
//!   +-----------------------------------------+
//! ```
//!
//! Every call goes to the platform's live environment; nothing is cached
//! between calls. See the [`env`] module for the thread-safety contract.
//!
//! # Example
//! ```no_run
//! # fn main() -> osenv::EnvResult<()> {
//! osenv::set("APP_MODE", "release")?;
//! let mode = osenv::get("APP_MODE")?;
//! assert_eq!(mode, "release");
//!
//! for (name, value) in osenv::snapshot()? {
//!     println!("{name}={value}");
//! }
//!
//! osenv::unset("APP_MODE")?;
//! # Ok(())
//! # }
//! ```

pub mod env;
pub mod error;

pub use env::{get, set, snapshot, unset};
pub use error::{EnvError, EnvResult};
