// SocFab - SoC Bus Fabric and Address Map Toolkit
// Copyright (C) 2026 Andrii Shylenko
//
// This software is released under the MIT License.
// See the LICENSE file in the project root for full license information.

use crate::Descriptor;
use proc_macro2::{Span, TokenStream};
use quote::{format_ident, quote};

fn hex(value: u32) -> syn::LitInt {
    syn::LitInt::new(&format!("0x{:08x}", value), Span::call_site())
}

/// A `no_std` module of base-address constants.
pub(crate) fn render(desc: &Descriptor) -> String {
    let mut items: Vec<TokenStream> = vec![quote! { #![allow(dead_code)] }];

    for e in desc.entries {
        let name = format_ident!("{}_BASE", e.symbolic_name);
        let base = hex(e.base_address);
        let doc = format!(" {} ({} driver), target `{}`.", e.symbolic_name, e.driver, e.target);
        items.push(quote! {
            #[doc = #doc]
            pub const #name: u32 = #base;
        });
    }

    let r = desc.regions;
    for (name, value) in [
        ("ROM_BASE", r.rom.base),
        ("ROM_SIZE", r.rom.size),
        ("RAM_BASE", r.ram.base),
        ("RAM_SIZE", r.ram.size),
    ] {
        let name = format_ident!("{}", name);
        let value = hex(value);
        items.push(quote! { pub const #name: u32 = #value; });
    }

    let names = desc.entries.iter().map(|e| e.symbolic_name.as_str());
    let bases = desc.entries.iter().map(|e| hex(e.base_address));
    items.push(quote! {
        pub const PERIPHERALS: &[(&str, u32)] = &[#((#names, #bases)),*];
    });

    let mut out = format!("// Generated by socfab for SoC '{}'. Do not edit.\n", desc.soc);
    for item in items {
        out.push_str(&item.to_string());
        out.push('\n');
    }
    out
}
