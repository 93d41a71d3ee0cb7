//! Coordinate compilation: synth labels → physical matrix indices
//!
//! Rows are compacted: a row's physical index is its ordinal among the
//! non-hidden row slots, so hiding a row shifts every row below it up by
//! one. Columns keep a plain offset (`label - colBase`); hidden columns are
//! excluded but never reorder their neighbours.

use hashbrown::{HashMap, HashSet};
use itertools::Itertools;
use tracing::debug;

use crate::blueprint::{Blueprint, DestinationDescriptor, SourceDescriptor};

/// Why a blueprint entry did not make it into the compiled matrix
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropReason {
    UnrecognizedKind,
    OutOfRange,
    Hidden,
}

/// A blueprint entry the compiler skipped
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DroppedEntry {
    Source { row_synth: u32, reason: DropReason },
    Destination { col_synth: u32, reason: DropReason },
}

/// Physical lookup tables for one matrix
#[derive(Clone, Debug, Default)]
pub struct CompiledMatrix {
    rows: usize,
    cols: usize,
    row_base: u32,
    col_base: u32,
    /// Visible row slots in order; position = physical row index
    visible_rows: Vec<usize>,
    hidden_rows: HashSet<usize>,
    hidden_cols: HashSet<usize>,

    source_map: HashMap<usize, SourceDescriptor>,
    dest_map: HashMap<usize, DestinationDescriptor>,
    row_map: HashMap<usize, usize>,
    channel_map: HashMap<usize, usize>,

    dropped: Vec<DroppedEntry>,
}

/// Compile a blueprint into physical lookup tables.
///
/// Pure and deterministic. Sparse or partial blueprints are fine: entries
/// that cannot be placed are dropped (see [`CompiledMatrix::dropped`]).
pub fn compile(blueprint: &Blueprint) -> CompiledMatrix {
    let rows = blueprint.grid.rows;
    let cols = blueprint.grid.cols;
    let row_base = blueprint.grid.coord_system.row_base;
    let col_base = blueprint.grid.coord_system.col_base;

    let hidden_rows = hidden_slots(
        blueprint.ui.hidden_rows0.as_deref(),
        &blueprint.ui.hidden_rows_synth,
        row_base,
        rows,
    );
    let hidden_cols = hidden_slots(
        blueprint.ui.hidden_cols0.as_deref(),
        &blueprint.ui.hidden_cols_synth,
        col_base,
        cols,
    );

    let visible_rows = (0..rows).filter(|slot| !hidden_rows.contains(slot)).collect();

    let mut matrix = CompiledMatrix {
        rows,
        cols,
        row_base,
        col_base,
        visible_rows,
        hidden_rows,
        hidden_cols,
        ..CompiledMatrix::default()
    };

    for entry in &blueprint.sources {
        let placed = match entry.source {
            SourceDescriptor::Unrecognized => Err(DropReason::UnrecognizedKind),
            source => matrix.place_row(entry.row_synth).map(|row| (row, source)),
        };
        match placed {
            Ok((row, source)) => {
                if let SourceDescriptor::Generator {
                    generator_index,
                    channel_id,
                } = source
                {
                    matrix.row_map.insert(row, generator_index);
                    matrix.channel_map.insert(row, channel_id.unwrap_or(0));
                } else {
                    matrix.row_map.remove(&row);
                    matrix.channel_map.remove(&row);
                }
                matrix.source_map.insert(row, source);
            }
            Err(reason) => matrix.dropped.push(DroppedEntry::Source {
                row_synth: entry.row_synth,
                reason,
            }),
        }
    }

    for entry in &blueprint.destinations {
        let placed = match entry.dest {
            DestinationDescriptor::Unrecognized => Err(DropReason::UnrecognizedKind),
            dest => matrix.place_col(entry.col_synth).map(|col| (col, dest)),
        };
        match placed {
            Ok((col, dest)) => {
                matrix.dest_map.insert(col, dest);
            }
            Err(reason) => matrix.dropped.push(DroppedEntry::Destination {
                col_synth: entry.col_synth,
                reason,
            }),
        }
    }

    if !matrix.dropped.is_empty() {
        debug!(dropped = matrix.dropped.len(), "blueprint entries skipped");
    }

    matrix
}

/// Merge physical (0-based) and legacy label-based hidden lists into slots.
///
/// The 0-based list wins when present, matching how newer blueprints are
/// written; out-of-range slots are ignored.
fn hidden_slots(slots0: Option<&[usize]>, labels: &[u32], base: u32, len: usize) -> HashSet<usize> {
    match slots0 {
        Some(slots) => slots.iter().copied().filter(|&slot| slot < len).collect(),
        None => labels
            .iter()
            .filter_map(|&label| label.checked_sub(base))
            .map(|slot| slot as usize)
            .filter(|&slot| slot < len)
            .collect(),
    }
}

impl CompiledMatrix {
    fn place_row(&self, label: u32) -> Result<usize, DropReason> {
        let slot = self.row_slot(label).ok_or(DropReason::OutOfRange)?;
        if self.hidden_rows.contains(&slot) {
            return Err(DropReason::Hidden);
        }
        self.synth_row_to_physical(label).ok_or(DropReason::OutOfRange)
    }

    fn place_col(&self, label: u32) -> Result<usize, DropReason> {
        let slot = self.col_slot(label).ok_or(DropReason::OutOfRange)?;
        if self.hidden_cols.contains(&slot) {
            return Err(DropReason::Hidden);
        }
        Ok(slot)
    }

    fn row_slot(&self, label: u32) -> Option<usize> {
        let slot = label.checked_sub(self.row_base)? as usize;
        (slot < self.rows).then_some(slot)
    }

    fn col_slot(&self, label: u32) -> Option<usize> {
        let slot = label.checked_sub(self.col_base)? as usize;
        (slot < self.cols).then_some(slot)
    }

    /// Physical row of a synth row label; `None` when hidden or out of range
    pub fn synth_row_to_physical(&self, label: u32) -> Option<usize> {
        let slot = self.row_slot(label)?;
        self.visible_rows.binary_search(&slot).ok()
    }

    /// Physical column of a synth column label; `None` when hidden or out of range
    pub fn synth_col_to_physical(&self, label: u32) -> Option<usize> {
        let slot = self.col_slot(label)?;
        (!self.hidden_cols.contains(&slot)).then_some(slot)
    }

    /// Synth label of a physical row
    pub fn physical_row_to_synth(&self, row: usize) -> Option<u32> {
        self.visible_rows
            .get(row)
            .map(|&slot| slot as u32 + self.row_base)
    }

    /// Synth label of a physical column
    pub fn physical_col_to_synth(&self, col: usize) -> Option<u32> {
        (col < self.cols && !self.hidden_cols.contains(&col)).then(|| col as u32 + self.col_base)
    }

    pub fn source_at(&self, row: usize) -> Option<&SourceDescriptor> {
        self.source_map.get(&row)
    }

    pub fn destination_at(&self, col: usize) -> Option<&DestinationDescriptor> {
        self.dest_map.get(&col)
    }

    /// Generator index behind a physical row, for generator rows only
    pub fn generator_at(&self, row: usize) -> Option<usize> {
        self.row_map.get(&row).copied()
    }

    /// Output tap behind a physical generator row
    pub fn channel_at(&self, row: usize) -> Option<usize> {
        self.channel_map.get(&row).copied()
    }

    /// Number of physical rows (`rows - |hidden rows|`)
    pub fn visible_rows(&self) -> usize {
        self.visible_rows.len()
    }

    /// Number of physical columns that resolve to a pin
    pub fn visible_cols(&self) -> usize {
        self.cols - self.hidden_cols.len()
    }

    /// Declared grid size, hidden slots included
    pub fn declared_size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn is_row_hidden(&self, label: u32) -> bool {
        self.row_slot(label)
            .map_or(false, |slot| self.hidden_rows.contains(&slot))
    }

    pub fn is_col_hidden(&self, label: u32) -> bool {
        self.col_slot(label)
            .map_or(false, |slot| self.hidden_cols.contains(&slot))
    }

    /// Hidden row labels, ascending
    pub fn hidden_row_labels(&self) -> Vec<u32> {
        self.hidden_rows
            .iter()
            .map(|&slot| slot as u32 + self.row_base)
            .sorted()
            .collect()
    }

    /// Hidden column labels, ascending
    pub fn hidden_col_labels(&self) -> Vec<u32> {
        self.hidden_cols
            .iter()
            .map(|&slot| slot as u32 + self.col_base)
            .sorted()
            .collect()
    }

    /// Physical rows that carry a source, ascending
    pub fn mapped_rows(&self) -> Vec<usize> {
        self.source_map.keys().copied().sorted().collect()
    }

    /// Physical columns that carry a destination, ascending
    pub fn mapped_cols(&self) -> Vec<usize> {
        self.dest_map.keys().copied().sorted().collect()
    }

    /// Blueprint entries that were skipped, for optional strict validation
    pub fn dropped(&self) -> &[DroppedEntry] {
        &self.dropped
    }
}
