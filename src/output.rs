// ========================================================================================
//
//                            THE RECIPIENT FILE WRITER
//
// ========================================================================================
//
// This module owns the output contract of the tool: the directory / file naming
// convention and the on-disk record layout of the per-recipient haplotype files.
// Both are consumed by a downstream imputation engine and must be reproduced
// exactly.
//
// For one ordering (forward or reverse) and one 1-based recipient position, the
// writer emits either:
//
//   position 1  — the strain-order listing: every strain name of the active
//                 order, one per line, at `{dir}.strainOrder`;
//   position k>1 — `{dir}/recip{k:04}_{name}.hap`, laid out as:
//                     0
//                     k
//                     <header block, source lines 3-5, verbatim>
//                     <donor sequence, one line per donor at positions 1..k-1>
//                     <the recipient's own sequence>
//
// Every sequence line is resolved name -> strain index -> panel sequence. A
// resolution that comes back empty means the list files and the haplotype file
// disagree about which strains exist; that is a fatal consistency error.

use crate::prepare::{HaplotypePanel, StrainIndex};
use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

// ========================================================================================
//                                   PUBLIC API
// ========================================================================================

/// Which of the two conditioning orders an output artifact belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Reverse,
}

impl Direction {
    /// The tag embedded in directory names.
    pub fn tag(self) -> &'static str {
        match self {
            Direction::Forward => "forward",
            Direction::Reverse => "reverse",
        }
    }
}

/// A comprehensive error type for the output phase.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to create output file {path}: {source}")]
    Create { path: String, source: io::Error },
    #[error("I/O error while writing {path}: {source}")]
    Write { path: String, source: io::Error },
    #[error(
        "Recipient position {position} is out of range: the ordering has {ordering_len} strains (valid positions are 1..={ordering_len})"
    )]
    PositionOutOfRange {
        position: usize,
        ordering_len: usize,
    },
    #[error(
        "Strain '{name}' has no haplotype sequence: the strain list and the haplotype file disagree"
    )]
    MissingHaplotype { name: String },
}

/// Builds the output directory name for one direction:
/// `{prefix}_orderedS{seed}_rnd{round:02}_{forward|reverse}`.
pub fn ordering_dir(prefix: &str, seed: u64, round: u32, direction: Direction) -> PathBuf {
    PathBuf::from(format!(
        "{prefix}_orderedS{seed}_rnd{round:02}_{}",
        direction.tag()
    ))
}

/// The strain-order listing path: the directory name with `.strainOrder`
/// appended (a sibling of the directory, not a file inside it).
pub fn strain_order_path(dir: &Path) -> PathBuf {
    let mut name = OsString::from(dir.as_os_str());
    name.push(".strainOrder");
    PathBuf::from(name)
}

/// The per-recipient haplotype path: `{dir}/recip{position:04}_{name}.hap`,
/// with the 1-based recipient position zero-padded to four digits.
pub fn recipient_hap_path(dir: &Path, position: usize, name: &str) -> PathBuf {
    dir.join(format!("recip{position:04}_{name}.hap"))
}

/// Materializes the output for one (ordering, recipient position) pair.
///
/// Returns the path of the `.hap` file written, or `None` when the listing
/// branch fired. The position is validated against the ordering before
/// anything touches the filesystem; 0 and past-the-end positions are rejected
/// rather than silently indexing out of range.
pub fn write_recipient_file(
    dir: &Path,
    listing_path: &Path,
    order: &[String],
    position: usize,
    panel: &HaplotypePanel,
    strain_index: &StrainIndex,
) -> Result<Option<PathBuf>, OutputError> {
    if position < 1 || position > order.len() {
        return Err(OutputError::PositionOutOfRange {
            position,
            ordering_len: order.len(),
        });
    }
    let recipient = position - 1; // 0-indexed from here on

    if recipient == 0 {
        write_strain_order(listing_path, order)?;
        return Ok(None);
    }

    let hap_path = recipient_hap_path(dir, position, &order[recipient]);
    let mut writer = create_buffered(&hap_path)?;

    let emit = |writer: &mut BufWriter<File>, text: &str| -> Result<(), OutputError> {
        writeln!(writer, "{text}").map_err(|source| OutputError::Write {
            path: hap_path.display().to_string(),
            source,
        })
    };

    emit(&mut writer, "0")?;
    emit(&mut writer, &position.to_string())?;
    // The header block already carries one trailing newline per captured line.
    write!(writer, "{}", panel.header).map_err(|source| OutputError::Write {
        path: hap_path.display().to_string(),
        source,
    })?;

    for donor in &order[..recipient] {
        let sequence = resolve_sequence(donor, panel, strain_index)?;
        emit(&mut writer, sequence)?;
    }
    let sequence = resolve_sequence(&order[recipient], panel, strain_index)?;
    emit(&mut writer, sequence)?;

    writer.flush().map_err(|source| OutputError::Write {
        path: hap_path.display().to_string(),
        source,
    })?;
    Ok(Some(hap_path))
}

/// Writes the strain-order listing: every name of the active order, one per
/// line, truncating any previous listing.
pub fn write_strain_order(listing_path: &Path, order: &[String]) -> Result<(), OutputError> {
    let mut writer = create_buffered(listing_path)?;
    for name in order {
        writeln!(writer, "{name}").map_err(|source| OutputError::Write {
            path: listing_path.display().to_string(),
            source,
        })?;
    }
    writer.flush().map_err(|source| OutputError::Write {
        path: listing_path.display().to_string(),
        source,
    })
}

// ========================================================================================
//                           PRIVATE IMPLEMENTATION HELPERS
// ========================================================================================

fn create_buffered(path: &Path) -> Result<BufWriter<File>, OutputError> {
    let file = File::create(path).map_err(|source| OutputError::Create {
        path: path.display().to_string(),
        source,
    })?;
    Ok(BufWriter::new(file))
}

/// Resolves a strain name through the index to its panel sequence.
///
/// An unknown name, an index past the panel, and a genuinely empty sequence
/// line all collapse to the same consistency failure: the strain has no usable
/// haplotype. On failure the full name -> index mapping is dumped at debug
/// level for diagnosis.
fn resolve_sequence<'p>(
    name: &str,
    panel: &'p HaplotypePanel,
    strain_index: &StrainIndex,
) -> Result<&'p str, OutputError> {
    let sequence = strain_index
        .position(name)
        .and_then(|position| panel.sequence(position))
        .unwrap_or("");

    if sequence.is_empty() {
        if log::log_enabled!(log::Level::Debug) {
            for (indexed_name, position) in strain_index.iter() {
                log::debug!("{indexed_name}\t{position}");
            }
        }
        return Err(OutputError::MissingHaplotype {
            name: name.to_string(),
        });
    }
    Ok(sequence)
}

// ========================================================================================
//                                      TESTS
// ========================================================================================
