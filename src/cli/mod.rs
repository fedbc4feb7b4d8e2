// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI support: input discovery and terminal reporting

pub mod inputs;
pub mod reporter;

pub use inputs::{collect_mesh_files, load_objects, save_objects};
pub use reporter::Reporter;
