// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::Descriptor;
use serde_json::json;

pub(crate) fn render(desc: &Descriptor) -> String {
    let peripherals: Vec<_> = desc
        .entries
        .iter()
        .map(|e| {
            json!({
                "name": e.symbolic_name,
                "driver": e.driver,
                "target": e.target,
                "base": e.base_address,
                "base_hex": format!("0x{:08x}", e.base_address),
            })
        })
        .collect();

    let doc = json!({
        "soc": desc.soc,
        "drivers": desc.drivers(),
        "peripherals": peripherals,
        "memory": {
            "rom": { "base": desc.regions.rom.base, "size": desc.regions.rom.size },
            "ram": { "base": desc.regions.ram.base, "size": desc.regions.ram.size },
        },
    });
    // Value's alternate Display is the pretty form; keys come out sorted.
    format!("{:#}\n", doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use socfab_core::map::{DescriptorEntry, MemoryRegions, Region};

    #[test]
    fn test_json_carries_the_same_data() {
        let entries = vec![DescriptorEntry {
            symbolic_name: "TIMER0".into(),
            driver: "plat_timer".into(),
            target: "timer".into(),
            base_address: 0xb300_0000,
        }];
        let regions = MemoryRegions {
            rom: Region {
                base: 0x0010_0000,
                size: 0x0010_0000,
            },
            ram: Region {
                base: 0x1000_0000,
                size: 0x2000,
            },
        };
        let text = render(&Descriptor {
            soc: "my-soc",
            entries: &entries,
            regions: &regions,
        });
        let v: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(v["soc"], "my-soc");
        assert_eq!(v["peripherals"][0]["name"], "TIMER0");
        assert_eq!(v["peripherals"][0]["base"], 0xb300_0000u32);
        assert_eq!(v["peripherals"][0]["base_hex"], "0xb3000000");
        assert_eq!(v["memory"]["ram"]["size"], 0x2000);
        assert!(text.ends_with("}\n"));
    }
}
