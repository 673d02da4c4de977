use std::collections::HashSet;
use synthbox_ports::catalog::SynthDefinition;
use synthbox_ports::settings::{ControllerMapping, Preset};
use synthbox_ports::types::{Cc, CC_MAX};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OutputShortfall {
    pub needed: usize,
    pub available: usize,
}

/// Input CCs for `count` new slots: consecutive values after the current maximum.
/// Returns the first value that would exceed 127 as the error.
pub fn next_input_ccs(existing: &[Cc], count: usize) -> Result<Vec<Cc>, u32> {
    let start = existing.iter().copied().max().map_or(1, |max| max as usize + 1);
    let room = (CC_MAX as usize + 1).saturating_sub(start);
    if count > room {
        return Err(start.max(CC_MAX as usize + 1) as u32);
    }
    Ok((start..start + count).map(|cc| cc as Cc).collect())
}

/// Picks an output CC for each of `count` new slots, scanning the synth's
/// parameters in catalog order and skipping CCs the preset already drives.
pub fn allocate_outputs(
    preset: &Preset,
    synth: &SynthDefinition,
    count: usize,
) -> Result<Vec<Cc>, OutputShortfall> {
    let mut used: HashSet<Cc> = preset.mappings.iter().map(|mapping| mapping.output).collect();
    let mut allocated = Vec::with_capacity(count);
    for parameter in &synth.parameters {
        if allocated.len() == count {
            break;
        }
        if used.insert(parameter.cc) {
            allocated.push(parameter.cc);
        }
    }

    if allocated.len() < count {
        return Err(OutputShortfall {
            needed: count,
            available: allocated.len(),
        });
    }
    Ok(allocated)
}

/// Mappings for a freshly created preset. Slot `i` drives the synth's `i`-th
/// parameter; slots past the end of the parameter list all drive the last one,
/// so duplicates are expected when the synth has fewer parameters than knobs.
///
/// Returns `None` when the synth exposes no parameters at all.
pub fn initial_mappings(synth: &SynthDefinition, input_ccs: &[Cc]) -> Option<Vec<ControllerMapping>> {
    let last = synth.parameters.last()?;
    Some(
        input_ccs
            .iter()
            .enumerate()
            .map(|(idx, input)| {
                let output = synth.parameters.get(idx).unwrap_or(last).cc;
                ControllerMapping::new(*input, output)
            })
            .collect(),
    )
}
