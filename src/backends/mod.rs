// SPDX-License-Identifier: GPL-3.0-only

//! Backend abstraction layer for sensing sessions
//!
//! # Modules
//!
//! - [`session`]: Session trait, raw frame types, lifecycle manager and
//!   the mock/replay implementations

pub mod session;
