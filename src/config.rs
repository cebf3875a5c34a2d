//! Configuration for a tree-growth context.
//!
//! A [`MembershipsConfig`] is handed to
//! [`RootRowMemberships::new`](crate::memberships::root::RootRowMemberships::new)
//! and shared, unchanged, by every node view created from that root.

use crate::membership_error::MembershipError;

/// Storage used for per-row bootstrap multiplicities.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum WeightEncoding {
    /// One byte per row. Multiplicities above 255 are rejected.
    #[default]
    Byte,
    /// Four bytes per row.
    Wide,
}

impl WeightEncoding {
    /// Largest weight representable by this encoding.
    #[inline]
    pub const fn max_weight(self) -> u32 {
        match self {
            WeightEncoding::Byte => u8::MAX as u32,
            WeightEncoding::Wide => u32::MAX,
        }
    }
}

/// How child node views store their row set.
#[derive(Copy, Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum DescendantLayout {
    /// Always a bit mask over root-local indices.
    Dense,
    /// Always an explicit array of root-local indices.
    Sparse,
    /// Sparse when the child holds less than `sparse_below` of the root rows.
    Auto { sparse_below: f64 },
}

impl Default for DescendantLayout {
    fn default() -> Self {
        DescendantLayout::Auto { sparse_below: 0.1 }
    }
}

impl DescendantLayout {
    /// Whether a child of `child_rows` rows under a root of `root_rows` rows
    /// should use the explicit index-array layout.
    pub fn prefers_sparse(self, child_rows: usize, root_rows: usize) -> bool {
        match self {
            DescendantLayout::Dense => false,
            DescendantLayout::Sparse => true,
            DescendantLayout::Auto { sparse_below } => {
                root_rows == 0 || (child_rows as f64) < sparse_below * root_rows as f64
            }
        }
    }
}

/// Knobs for one tree-growth context.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct MembershipsConfig {
    /// Encoding of the root's weight container.
    pub weight_encoding: WeightEncoding,
    /// Number of most-recently-used column entries kept strongly reachable.
    pub retained_columns: usize,
    /// Layout selection for child node views.
    pub descendant_layout: DescendantLayout,
    /// Promote a child to a fresh root once it holds less than this fraction
    /// of its root's rows. `None` never re-roots.
    pub reroot_below: Option<f64>,
}

impl Default for MembershipsConfig {
    fn default() -> Self {
        Self {
            weight_encoding: WeightEncoding::Byte,
            retained_columns: 64,
            descendant_layout: DescendantLayout::default(),
            reroot_below: None,
        }
    }
}

impl MembershipsConfig {
    /// Reject fractions outside `[0, 1]` (including NaN).
    pub fn validate(&self) -> Result<(), MembershipError> {
        let in_unit = |f: f64| (0.0..=1.0).contains(&f);
        if let DescendantLayout::Auto { sparse_below } = self.descendant_layout {
            if !in_unit(sparse_below) {
                return Err(MembershipError::Construction(format!(
                    "sparse_below must lie in [0, 1], got {sparse_below}"
                )));
            }
        }
        if let Some(t) = self.reroot_below {
            if !in_unit(t) {
                return Err(MembershipError::Construction(format!(
                    "reroot_below must lie in [0, 1], got {t}"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_layout_switches_on_fraction() {
        let layout = DescendantLayout::Auto { sparse_below: 0.25 };
        assert!(!layout.prefers_sparse(30, 100));
        assert!(layout.prefers_sparse(24, 100));
        assert!(DescendantLayout::Sparse.prefers_sparse(100, 100));
        assert!(!DescendantLayout::Dense.prefers_sparse(0, 100));
    }

    #[test]
    fn validate_rejects_bad_fractions() {
        let mut cfg = MembershipsConfig::default();
        assert!(cfg.validate().is_ok());
        cfg.reroot_below = Some(f64::NAN);
        assert!(matches!(cfg.validate(), Err(MembershipError::Construction(_))));
        cfg.reroot_below = None;
        cfg.descendant_layout = DescendantLayout::Auto { sparse_below: 1.5 };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg: MembershipsConfig =
            serde_json::from_str(r#"{ "weight_encoding": "Wide", "reroot_below": 0.05 }"#)
                .unwrap();
        assert_eq!(cfg.weight_encoding, WeightEncoding::Wide);
        assert_eq!(cfg.reroot_below, Some(0.05));
        assert_eq!(cfg.retained_columns, 64);
        assert_eq!(cfg.descendant_layout, DescendantLayout::default());
    }
}
