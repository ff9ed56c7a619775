// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::Descriptor;
use std::fmt::Write;

pub(crate) fn render(desc: &Descriptor) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "/* Generated by socfab for SoC '{}'. Do not edit. */", desc.soc);
    out.push_str("#ifndef SOC_H\n#define SOC_H\n\n#include <stdint.h>\n");

    if !desc.entries.is_empty() {
        out.push('\n');
        for driver in desc.drivers() {
            let _ = writeln!(out, "#include \"drivers/{}.h\"", driver);
        }
        out.push('\n');
        for e in desc.entries {
            let _ = writeln!(
                out,
                "static volatile {d}_regs_t *const {n} = (volatile {d}_regs_t*)0x{b:08x};",
                d = e.driver,
                n = e.symbolic_name,
                b = e.base_address
            );
        }
    }

    out.push('\n');
    let r = desc.regions;
    for (name, value) in [
        ("SOC_ROM_BASE", r.rom.base),
        ("SOC_ROM_SIZE", r.rom.size),
        ("SOC_RAM_BASE", r.ram.base),
        ("SOC_RAM_SIZE", r.ram.size),
    ] {
        let _ = writeln!(out, "#define {:<13} 0x{:08x}u", name, value);
    }
    out.push_str("\n#endif /* SOC_H */\n");
    out
}
