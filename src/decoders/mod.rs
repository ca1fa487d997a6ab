/*! Individual protocol decoders, one module per device family.

Each decoder module exposes a `register(registry: &mut DecoderRegistry)`
function that appends its [`crate::decoder::Decoder`] descriptor(s).
[`all`] builds a registry with every decoder in this crate enabled,
the way the dispatch loop matches the same burst against every
registered decoder regardless of which one ends up firing.
*/

use crate::decoder::DecoderRegistry;

pub mod acurite_606;
pub mod alecto_v1;
pub mod efergy_e2;
pub mod fineoffset_wh2;
pub mod lacrosse_tx141x;
pub mod oregon_scientific_v2;
pub mod prologue;
pub mod thermopro_tp12;
pub mod tpms_generic;
pub mod watts_wfht;
pub mod x10_security;

/// Build a registry with every decoder in this crate registered.
#[must_use]
pub fn all() -> DecoderRegistry {
    let mut reg = DecoderRegistry::new();
    acurite_606::register(&mut reg);
    alecto_v1::register(&mut reg);
    efergy_e2::register(&mut reg);
    fineoffset_wh2::register(&mut reg);
    lacrosse_tx141x::register(&mut reg);
    oregon_scientific_v2::register(&mut reg);
    prologue::register(&mut reg);
    thermopro_tp12::register(&mut reg);
    tpms_generic::register(&mut reg);
    watts_wfht::register(&mut reg);
    x10_security::register(&mut reg);
    reg
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_registers_every_decoder() {
        assert_eq!(all().len(), 11);
    }
}
