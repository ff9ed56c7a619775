// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::Descriptor;
use std::fmt::Write;

pub(crate) fn render(desc: &Descriptor) -> String {
    let r = desc.regions;
    let mut out = String::new();
    let _ = writeln!(out, "/* Generated by socfab for SoC '{}'. Do not edit. */", desc.soc);
    out.push_str("MEMORY\n{\n");
    let _ = writeln!(
        out,
        "    FLASH (rx)  : ORIGIN = 0x{:08x}, LENGTH = 0x{:08x}",
        r.rom.base, r.rom.size
    );
    let _ = writeln!(
        out,
        "    RAM   (xrw) : ORIGIN = 0x{:08x}, LENGTH = 0x{:08x}",
        r.ram.base, r.ram.size
    );
    out.push_str("}\n\n");
    out.push_str(SECTIONS);
    out
}

const SECTIONS: &str = "\
SECTIONS
{
    .text :
    {
        _ftext = .;
        KEEP(*(.text.start))
        *(.text .text.*)
        _etext = .;
    } > FLASH

    .rodata :
    {
        . = ALIGN(4);
        *(.rodata .rodata.* .srodata .srodata.*)
        . = ALIGN(4);
    } > FLASH

    .data :
    {
        . = ALIGN(4);
        _fdata = .;
        *(.data .data.* .sdata .sdata.*)
        . = ALIGN(4);
        _edata = .;
    } > RAM AT > FLASH

    .bss (NOLOAD) :
    {
        . = ALIGN(4);
        _fbss = .;
        *(.bss .bss.* .sbss .sbss.* COMMON)
        . = ALIGN(4);
        _ebss = .;
    } > RAM

    _fdata_rom = LOADADDR(.data);
    _fstack = ORIGIN(RAM) + LENGTH(RAM) - 4;
}
";
