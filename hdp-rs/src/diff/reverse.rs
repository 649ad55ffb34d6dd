//! Delta inversion.

use crate::delta::{Change, Delta, Path, PathToken};

use super::move_table::MoveTable;

/// Returns the delta that undoes `delta`.
///
/// Additions and deletions swap, modifications swap their sides and each
/// move points back at the index it came from. Item indices inside paths are
/// output indices of the forward delta; they are rewritten to the matching
/// input indices, which are the output indices once reversed.
///
/// Reversing twice gives back the original delta.
pub fn reverse(delta: &Delta) -> Delta {
    let moves = MoveTable::from_delta(delta);

    delta
        .iter()
        .map(|(path, change)| {
            let mut reversed_path = if moves.is_empty() {
                path.clone()
            } else {
                rewrite_indices(path, change, &moves)
            };

            let reversed_change = match change {
                Change::Added(new) => Change::Deleted(new.clone()),
                Change::Deleted(old) => Change::Added(old.clone()),
                Change::Modified { old, new } => Change::Modified {
                    old: new.clone(),
                    new: old.clone(),
                },
                Change::Moved { from, value } => match path.last() {
                    Some(PathToken::Move(dest)) => {
                        reversed_path = reversed_path.with_token(path.depth() - 1, PathToken::Move(*from));
                        Change::Moved {
                            from: *dest,
                            value: value.clone(),
                        }
                    }
                    // Not a valid move; the patcher reports it.
                    _ => change.clone(),
                },
            };

            (reversed_path, reversed_change)
        })
        .collect()
}

/// Maps item indices through the moves of the list they index.
///
/// A trailing index names an output slot for additions and an input slot for
/// deletions, which trade places when reversed, so only a trailing index
/// that is modified in place is mapped.
fn rewrite_indices(path: &Path, change: &Change, moves: &MoveTable) -> Path {
    let last = path.depth().saturating_sub(1);
    let tokens = path
        .tokens()
        .iter()
        .enumerate()
        .map(|(k, token)| match token {
            PathToken::Index(output)
                if k < last || matches!(change, Change::Modified { .. }) =>
            {
                PathToken::Index(moves.source(&path.prefix(k), *output))
            }
            other => other.clone(),
        })
        .collect();
    Path::new(tokens)
}
