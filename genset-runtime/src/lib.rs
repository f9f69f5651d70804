// Copyright (C) 2024 Laixer Equipment B.V.
// All rights reserved.
//
// This software may be modified and distributed under the terms
// of the included license.  See the LICENSE file for details.

//! Marine diesel generator simulation runtime.
//!
//! The [`GeneratorEngine`] models the operating state machine of a diesel
//! generator set together with its instrumentation and alarm handling. The
//! engine is advanced in discrete time steps by the caller. The [`service`]
//! module provides the simulation loop and a line protocol server to host the
//! engine on the tokio runtime.

pub mod core;
pub mod driver;
pub mod math;
pub mod protocol;
pub mod service;

mod config;
mod generator;

pub use self::config::*;
pub use self::generator::GeneratorEngine;

pub use rand;

pub mod runtime;
pub use self::runtime::Error;
pub use self::runtime::RuntimeContext;
pub use self::runtime::SharedGenerator;

/// Generator runtime constants.
pub mod consts {
    /// Runtime version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Default network port of the command protocol.
    ///
    /// # Example
    ///
    /// ```
    /// use genset::consts::DEFAULT_NETWORK_PORT;
    ///
    /// println!("Default network port: {}", DEFAULT_NETWORK_PORT);
    /// ```
    pub const DEFAULT_NETWORK_PORT: u16 = 8081;
}
