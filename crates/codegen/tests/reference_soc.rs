// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use socfab_codegen::{Exporter, HEADER_FILE, JSON_FILE, LINKER_FILE};
use socfab_config::SocDescriptor;
use socfab_core::system::Soc;
use socfab_core::ConfigError;
use std::path::PathBuf;

fn reference_soc() -> SocDescriptor {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../configs/socs/my-soc.yaml");
    SocDescriptor::from_file(path).expect("Failed to load reference SoC")
}

#[test]
fn test_reference_soc_exports() {
    let soc = Soc::assemble(&reference_soc()).unwrap();
    let map = soc.map();
    let artifact = Exporter::new(soc.decoder())
        .named(&map.soc)
        .export(&map.descriptor_entries(), &map.regions)
        .unwrap();

    let header = artifact.file(HEADER_FILE).unwrap();
    for line in [
        "static volatile spiflash_regs_t *const FLASH_CTRL = (volatile spiflash_regs_t*)0xb0000000;",
        "static volatile gpio_regs_t *const LED_GPIO = (volatile gpio_regs_t*)0xb1000000;",
        "static volatile uart_regs_t *const UART0 = (volatile uart_regs_t*)0xb2000000;",
    ] {
        assert!(header.contains(line), "missing: {line}");
    }
    // Disabled peripherals never reach firmware.
    assert!(!header.contains("BTN_GPIO"));

    let lds = artifact.file(LINKER_FILE).unwrap();
    assert!(lds.contains("ORIGIN = 0x00100000, LENGTH = 0x00100000"));

    let json: serde_json::Value = serde_json::from_str(artifact.file(JSON_FILE).unwrap()).unwrap();
    let names: Vec<_> = json["peripherals"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["FLASH_CTRL", "LED_GPIO", "UART0", "TIMER0", "SOC_ID"]);
}

#[test]
fn test_reference_soc_export_is_reproducible() {
    let digests: Vec<String> = (0..2)
        .map(|_| {
            let soc = Soc::assemble(&reference_soc()).unwrap();
            let map = soc.map();
            Exporter::new(soc.decoder())
                .named(&map.soc)
                .export(&map.descriptor_entries(), &map.regions)
                .unwrap()
                .digest()
        })
        .collect();
    assert_eq!(digests[0], digests[1]);
}

#[test]
fn test_colliding_export_names_abort() {
    let mut desc = reference_soc();
    let uart = desc.targets.iter_mut().find(|t| t.id == "uart").unwrap();
    uart.export.as_mut().unwrap().name = "LED_GPIO".to_string();

    let soc = Soc::assemble(&desc).unwrap();
    let map = soc.map();
    let err = Exporter::new(soc.decoder())
        .export(&map.descriptor_entries(), &map.regions)
        .unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateName { ref name, .. } if name == "LED_GPIO"));
}
