// SPDX-License-Identifier: AGPL-3.0-or-later

#![forbid(unsafe_code)]
#![deny(clippy::expect_used, clippy::unwrap_used)]

//! wetSpring Otolith — hitting-set identification codes for marker tables.
//!
//! An otolith is the ear stone biologists read to tell one fish from
//! another. This crate does the same for survey samples: given a
//! sample-by-feature abundance table, it finds for each sample a short
//! combination of its own markers that no other sample carries — a code
//! that re-identifies the sample in a later survey of the same population.
//!
//! Two operations share one core:
//!
//! - **Encode** — load a table, rank each sample's features (by rarity or
//!   abundance gap), and greedily grow per-sample hitting sets.
//! - **Decode** — load a table and previously saved codes, find every
//!   sample whose feature set covers each code, and classify the outcomes
//!   into a five-bucket confusion summary.
//!
//! Sample and feature order from the input file drive every iteration and
//! tie-break, so identical inputs always produce identical outputs.

pub mod config;
pub mod decode;
pub mod encode;
pub mod error;
pub mod io;
pub mod rank;
pub mod table;
pub mod validation;
