// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use super::Soc;
use anyhow::Context;
use socfab_config::SocDescriptor;
use std::path::Path;
use tracing::info;

/// Loads a SoC descriptor and assembles it.
pub fn build_soc(soc_path: &Path) -> anyhow::Result<Soc> {
    info!("Loading SoC descriptor: {:?}", soc_path);
    let desc = SocDescriptor::from_file(soc_path)?;
    let soc = Soc::assemble(&desc)
        .with_context(|| format!("Failed to assemble SoC from {:?}", soc_path))?;
    Ok(soc)
}
