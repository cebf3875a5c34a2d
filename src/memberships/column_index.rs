//! Column order restricted to one root's rows.
//!
//! The loader never sorts. It walks the column's full, globally sorted order
//! and keeps only the positions whose row belongs to the root; filtering a
//! sorted sequence preserves its order, so the result is the root's rows in
//! ascending column position.

use std::time::Instant;

use itertools::Itertools;

use crate::data::row_index_manager::RowIndexManager;
use crate::debug_invariants::DebugInvariants;
use crate::membership_error::{MembershipError, check_index};
use crate::memberships::ranked_mask::RankedMask;

/// One cached column entry.
///
/// "Restricted position" `p` ranges over `0..len()` and orders the root's
/// rows by ascending column position.
#[derive(Debug, PartialEq, Eq)]
pub struct ColumnIndex {
    column: usize,
    /// `root_local[p]`: root-local index of the row at restricted position `p`.
    root_local: Box<[u32]>,
    /// `column_position[p]`: that row's position in the full column order.
    column_position: Box<[u32]>,
    /// `restricted_position[r]`: restricted position of root-local row `r`.
    restricted_position: Box<[u32]>,
}

impl ColumnIndex {
    /// Derive the entry for `column` from the full column order.
    ///
    /// `original_indices` is the root's ascending original-index array.
    ///
    /// ## Complexity
    /// O(table rows) time and one temporary `u32` per table row.
    pub(crate) fn load(
        column: usize,
        original_indices: &[u32],
        manager: &RowIndexManager,
    ) -> Result<Self, MembershipError> {
        let started = Instant::now();
        let positions = manager.positions_in_column(column)?;

        // Mark each root row at its full column position.
        let mut local_at = vec![u32::MAX; positions.len()];
        for (local, &original) in original_indices.iter().enumerate() {
            check_index(original as usize, positions.len())?;
            local_at[positions[original as usize] as usize] = local as u32;
        }

        let entry = Self::from_pairs(
            column,
            original_indices.len(),
            local_at
                .iter()
                .enumerate()
                .filter(|&(_, &local)| local != u32::MAX)
                .map(|(pos, &local)| (local, pos as u32)),
        )?;
        log::debug!(
            "column index {column} computed for {} root rows in {:?}",
            entry.len(),
            started.elapsed()
        );
        Ok(entry)
    }

    /// Derive the entry of a root whose rows are a subset of `parent`'s.
    ///
    /// `parent_locals[local]` is the parent-root-local index of the new
    /// root's row `local`; it must be strictly ascending.
    ///
    /// ## Complexity
    /// O(parent root rows), independent of the table size.
    pub(crate) fn restrict(parent: &ColumnIndex, parent_locals: &[u32]) -> Result<Self, MembershipError> {
        let started = Instant::now();
        let mut local_of = vec![u32::MAX; parent.len()];
        for (local, &p) in parent_locals.iter().enumerate() {
            check_index(p as usize, parent.len())?;
            local_of[p as usize] = local as u32;
        }

        let entry = Self::from_pairs(
            parent.column,
            parent_locals.len(),
            (0..parent.len()).filter_map(|p| {
                let local = local_of[parent.root_local(p)];
                (local != u32::MAX).then_some((local, parent.column_position[p]))
            }),
        )?;
        log::debug!(
            "column index {} narrowed from {} to {} root rows in {:?}",
            entry.column,
            parent.len(),
            entry.len(),
            started.elapsed()
        );
        Ok(entry)
    }

    /// Assemble an entry from `(root_local, column_position)` pairs given in
    /// ascending column position; exactly `n` pairs are expected.
    fn from_pairs<I>(column: usize, n: usize, rows: I) -> Result<Self, MembershipError>
    where
        I: IntoIterator<Item = (u32, u32)>,
    {
        let mut root_local = Vec::with_capacity(n);
        let mut column_position = Vec::with_capacity(n);
        let mut restricted_position = vec![0u32; n];
        for (local, pos) in rows {
            restricted_position[local as usize] = root_local.len() as u32;
            root_local.push(local);
            column_position.push(pos);
        }
        if root_local.len() != n {
            return Err(MembershipError::Construction(format!(
                "column {column}: {} of {n} root rows found in the column order",
                root_local.len()
            )));
        }
        let entry = Self {
            column,
            root_local: root_local.into_boxed_slice(),
            column_position: column_position.into_boxed_slice(),
            restricted_position: restricted_position.into_boxed_slice(),
        };
        entry.debug_assert_invariants();
        Ok(entry)
    }

    #[inline]
    pub fn column(&self) -> usize {
        self.column
    }

    /// Number of root rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.root_local.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root_local.is_empty()
    }

    /// Root-local index at restricted position `p` (`p < len()`).
    #[inline]
    pub fn root_local(&self, p: usize) -> usize {
        self.root_local[p] as usize
    }

    /// Full column position at restricted position `p` (`p < len()`).
    #[inline]
    pub fn column_position(&self, p: usize) -> usize {
        self.column_position[p] as usize
    }

    /// Restricted position of root-local row `local` (`local < len()`).
    #[inline]
    pub fn restricted_position(&self, local: usize) -> usize {
        self.restricted_position[local] as usize
    }

    /// Ascending full column positions of the root's rows.
    #[inline]
    pub fn column_positions(&self) -> &[u32] {
        &self.column_position
    }

    /// Translate a set of root-local rows into a mask over restricted
    /// positions. O(root rows) regardless of the table size.
    pub fn restricted_mask<I>(&self, root_locals: I) -> Result<RankedMask, MembershipError>
    where
        I: IntoIterator<Item = usize>,
    {
        let n = self.len();
        let mut positions = Vec::new();
        for local in root_locals {
            check_index(local, n)?;
            positions.push(self.restricted_position(local));
        }
        RankedMask::from_ones(n, positions)
    }
}

impl DebugInvariants for ColumnIndex {
    fn validate_invariants(&self) -> Result<(), MembershipError> {
        let n = self.len();
        if self.column_position.len() != n || self.restricted_position.len() != n {
            return Err(MembershipError::Construction(format!(
                "column {}: arrays of unequal length",
                self.column
            )));
        }
        if let Some((a, b)) = self.column_position.iter().tuple_windows().find(|(a, b)| a >= b) {
            return Err(MembershipError::Construction(format!(
                "column {}: column positions not ascending: {a} then {b}",
                self.column
            )));
        }
        for (p, &local) in self.root_local.iter().enumerate() {
            if self.restricted_position.get(local as usize).copied() != Some(p as u32) {
                return Err(MembershipError::Construction(format!(
                    "column {}: restricted position {p} and root row {local} are not inverse",
                    self.column
                )));
            }
        }
        Ok(())
    }
}
