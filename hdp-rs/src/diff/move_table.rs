//! Moves of a delta, indexed by the array they act on.

use rustc_hash::FxHashMap;

use crate::delta::{Change, Delta, Path, PathToken};

/// For every array path, the output index of each moved item and the input
/// index it comes from.
#[derive(Debug, Default)]
pub(crate) struct MoveTable {
    by_array: FxHashMap<Path, FxHashMap<usize, usize>>,
}

impl MoveTable {
    pub(crate) fn from_delta(delta: &Delta) -> Self {
        let mut table = MoveTable::default();
        for (path, change) in delta {
            if let (Some(PathToken::Move(dest)), Change::Moved { from, .. }) = (path.last(), change)
            {
                let array = path.parent().unwrap_or_default();
                table.by_array.entry(array).or_default().insert(*dest, *from);
            }
        }
        table
    }

    /// Input index of the item found at `output` once `array` is rebuilt.
    /// Items that do not move keep their index.
    pub(crate) fn source(&self, array: &Path, output: usize) -> usize {
        self.by_array
            .get(array)
            .and_then(|moves| moves.get(&output))
            .copied()
            .unwrap_or(output)
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.by_array.is_empty()
    }
}
