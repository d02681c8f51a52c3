// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Service layer. Bridges the command line to the scanwerk backend crates.

pub mod app_services;
pub mod console;
pub mod data_dir;
