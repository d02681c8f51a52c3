// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// scanwerk-storage: Durable storage for Scanwerk.
//
// Provides the tag store: a set of user-assigned labels kept in a single
// file of length-prefixed UTF-8 records.

pub mod codec;
pub mod tags;

pub use codec::{decode_tags, encode_tags};
pub use tags::{FileTagStore, TagStorage};
