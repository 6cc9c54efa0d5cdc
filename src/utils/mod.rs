// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 danku contributors

//! Terminal output helpers

pub mod colors;
pub mod spinner;

pub use colors::*;
pub use spinner::*;
