//! Diff, patch and reverse.
//!
//! [`Differ`] compares two trees and produces a flat [`Delta`](crate::Delta);
//! [`Patcher`] applies one to a tree; [`reverse`] inverts one.

mod generator;
mod move_table;
mod options;
mod patch;
mod reverse;

pub use generator::Differ;
pub use options::{ArrayOptions, DiffOptions, PatchOptions, PropertyFilter, TextDiffOptions};
pub use patch::Patcher;
pub use reverse::reverse;
