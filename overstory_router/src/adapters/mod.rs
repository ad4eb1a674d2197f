// Copyright 2026 the Overstory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adapters binding the router to concrete scene sources.
//!
//! Each adapter is behind a cargo feature so the core router stays free of
//! scene dependencies.

#[cfg(feature = "stage_adapter")]
pub mod stage;
