// ========================================================================================
//
//                        INPUT PARSING & PREPARATION ENGINE
//
// ========================================================================================
//
// This module is the sole authority on input handling. It transforms the three raw
// input files (haplotype panel, strain-index list, ordering list) into validated,
// pipeline-ready data structures, and nothing downstream ever touches a file it
// has not vetted.
//
// The entry point is `prepare_inputs`, which returns a single `PreparationResult`.
// The successful creation of that struct is a run-time guarantee that every input
// file was opened and read to the end; consistency *between* the files (does every
// ordered strain actually have a haplotype?) is deliberately not checked here —
// it is resolved lazily by the writer, which is the only component that knows
// which strains a given recipient actually needs.

use ahash::AHashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// 1-indexed span of source lines retained verbatim as the shared header block.
const HEADER_LINES: std::ops::RangeInclusive<usize> = 3..=5;

// ========================================================================================
//                                   PUBLIC API
// ========================================================================================

/// A comprehensive error type for the preparation phase.
///
/// Every variant carries the offending path: an input failure is always a
/// user-facing message about a concrete file.
#[derive(Error, Debug)]
pub enum PrepError {
    #[error("Failed to open file {path}: {source}")]
    Open {
        path: String,
        source: std::io::Error,
    },
    #[error("I/O error while reading {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
}

/// The haplotype panel: the shared header block plus one sequence line per strain
/// position.
#[derive(Debug)]
pub struct HaplotypePanel {
    /// Source lines 3–5 concatenated, each newline-terminated, byte-for-byte.
    pub header: String,
    /// Sequence lines in file order; 1-indexed position `n` lives at `[n - 1]`.
    sequences: Vec<String>,
}

impl HaplotypePanel {
    /// Looks up the sequence at a 1-indexed strain position.
    pub fn sequence(&self, position: usize) -> Option<&str> {
        position
            .checked_sub(1)
            .and_then(|i| self.sequences.get(i))
            .map(String::as_str)
    }

    pub fn num_sequences(&self) -> usize {
        self.sequences.len()
    }
}

/// Mapping from strain name to its 1-based position in the strain list file.
///
/// Insertion order equals position order. A duplicated name overwrites its
/// earlier entry (last wins) while the position counter keeps advancing, so
/// later strains keep the positions the file gives them.
#[derive(Debug, Default)]
pub struct StrainIndex {
    by_name: AHashMap<String, usize>,
}

impl StrainIndex {
    /// The 1-based position of `name`, if the strain list mentions it.
    pub fn position(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Iterates over `(name, position)` pairs in unspecified order. Used for
    /// the diagnostic dump when a lookup fails.
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.by_name.iter().map(|(name, &pos)| (name.as_str(), pos))
    }
}

/// The validated, pipeline-ready data produced by this module.
#[derive(Debug)]
pub struct PreparationResult {
    pub panel: HaplotypePanel,
    pub strain_index: StrainIndex,
    /// Strain names whose order gets randomized, in file order, duplicates kept.
    pub ordering: Vec<String>,
}

/// The single entry point for the preparation phase: parses all three input
/// files, in order, failing fast on the first unreadable one.
pub fn prepare_inputs(
    hap_path: &Path,
    strain_list_path: &Path,
    ordering_path: &Path,
) -> Result<PreparationResult, PrepError> {
    let panel = load_haplotype_panel(hap_path)?;
    let strain_index = load_strain_index(strain_list_path)?;
    let ordering = load_ordering(ordering_path)?;
    Ok(PreparationResult {
        panel,
        strain_index,
        ordering,
    })
}

/// Parses the haplotype source file.
///
/// Lines 3–5 (1-indexed) become the header block, preserved byte-for-byte with
/// their newlines. Every line past line 5 is one strain's haplotype sequence,
/// keyed by `line_number - 5`. Sequence content is never validated; lines of
/// any length are accepted verbatim.
pub fn load_haplotype_panel(path: &Path) -> Result<HaplotypePanel, PrepError> {
    let reader = open_buffered(path)?;

    let mut header = String::new();
    let mut sequences = Vec::new();
    for (idx, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(|source| PrepError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let line_number = idx + 1;
        if HEADER_LINES.contains(&line_number) {
            header.push_str(&line);
            header.push('\n');
        } else if line_number > *HEADER_LINES.end() {
            sequences.push(line);
        }
    }

    Ok(HaplotypePanel { header, sequences })
}

/// Parses the strain-index list file: one strain per line, first tab-delimited
/// field is the name, positions assigned sequentially from 1 in file order.
///
/// Empty lines are skipped without consuming a position. (The historical tool
/// left empty-line behavior undefined; skipping is this implementation's
/// explicit choice.)
pub fn load_strain_index(path: &Path) -> Result<StrainIndex, PrepError> {
    let mut index = StrainIndex::default();
    let mut next_position = 1;
    for_each_strain_name(path, |name| {
        index.by_name.insert(name.to_string(), next_position);
        next_position += 1;
    })?;
    Ok(index)
}

/// Parses the ordering list file with the same line/field rules as
/// `load_strain_index`, but preserves order and duplicates.
pub fn load_ordering(path: &Path) -> Result<Vec<String>, PrepError> {
    let mut ordering = Vec::new();
    for_each_strain_name(path, |name| ordering.push(name.to_string()))?;
    Ok(ordering)
}

// ========================================================================================
//                           PRIVATE IMPLEMENTATION HELPERS
// ========================================================================================

fn open_buffered(path: &Path) -> Result<BufReader<File>, PrepError> {
    let file = File::open(path).map_err(|source| PrepError::Open {
        path: path.display().to_string(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Shared line walk for the two list-file loaders: extracts the first
/// tab-delimited token of each non-empty line and hands it to `consume`.
fn for_each_strain_name(
    path: &Path,
    mut consume: impl FnMut(&str),
) -> Result<(), PrepError> {
    let reader = open_buffered(path)?;
    for line_result in reader.lines() {
        let line = line_result.map_err(|source| PrepError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let name = match line.split('\t').next() {
            Some(token) if !token.is_empty() => token,
            _ => continue,
        };
        consume(name);
    }
    Ok(())
}

// ========================================================================================
//                                      TESTS
// ========================================================================================
