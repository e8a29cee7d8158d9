// SPDX-License-Identifier: MIT
//! Artifact categories and the combinable kind set.
//!
//! An artifact may belong to several categories at once (a compiled test
//! assembly is both `Assembly` and `Test`), so analyzers report discoveries
//! against a [`KindSet`] rather than a single kind.

use std::fmt;
use std::ops::BitOr;

use serde::{Deserialize, Serialize};

// ── ArtifactKind ─────────────────────────────────────────────────────────────

/// A single artifact category.
///
/// Doubles as an analyzer role: every analyzer declares exactly one kind it
/// handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Solution,
    Project,
    Assembly,
    Test,
    Executable,
}

impl ArtifactKind {
    /// All kinds, in declaration order. [`KindSet::iter`] yields in this
    /// order.
    pub const ALL: [ArtifactKind; 5] = [
        ArtifactKind::Solution,
        ArtifactKind::Project,
        ArtifactKind::Assembly,
        ArtifactKind::Test,
        ArtifactKind::Executable,
    ];

    const fn bit(self) -> u8 {
        match self {
            ArtifactKind::Solution => 1 << 0,
            ArtifactKind::Project => 1 << 1,
            ArtifactKind::Assembly => 1 << 2,
            ArtifactKind::Test => 1 << 3,
            ArtifactKind::Executable => 1 << 4,
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ArtifactKind::Solution => "solution",
            ArtifactKind::Project => "project",
            ArtifactKind::Assembly => "assembly",
            ArtifactKind::Test => "test",
            ArtifactKind::Executable => "executable",
        };
        f.write_str(name)
    }
}

// ── KindSet ──────────────────────────────────────────────────────────────────

/// A combinable set of [`ArtifactKind`]s.
///
/// Compose with `|`:
///
/// ```
/// use assay::artifact::ArtifactKind;
///
/// let kinds = ArtifactKind::Assembly | ArtifactKind::Test;
/// assert!(kinds.contains(ArtifactKind::Test));
/// assert!(!kinds.contains(ArtifactKind::Solution));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KindSet(u8);

impl KindSet {
    /// The empty set. Iterates nothing, contains nothing.
    pub const EMPTY: KindSet = KindSet(0);

    /// Set holding a single kind.
    pub const fn of(kind: ArtifactKind) -> Self {
        KindSet(kind.bit())
    }

    /// Membership test.
    pub const fn contains(self, kind: ArtifactKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Number of kinds in the set.
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Expand into individual kinds, in declaration order. Restartable —
    /// the set is `Copy` and iteration does not consume it.
    pub fn iter(self) -> impl Iterator<Item = ArtifactKind> {
        ArtifactKind::ALL
            .into_iter()
            .filter(move |kind| self.contains(*kind))
    }
}

impl From<ArtifactKind> for KindSet {
    fn from(kind: ArtifactKind) -> Self {
        KindSet::of(kind)
    }
}

impl BitOr for KindSet {
    type Output = KindSet;

    fn bitor(self, rhs: KindSet) -> KindSet {
        KindSet(self.0 | rhs.0)
    }
}

impl BitOr<ArtifactKind> for KindSet {
    type Output = KindSet;

    fn bitor(self, rhs: ArtifactKind) -> KindSet {
        KindSet(self.0 | rhs.bit())
    }
}

impl BitOr for ArtifactKind {
    type Output = KindSet;

    fn bitor(self, rhs: ArtifactKind) -> KindSet {
        KindSet(self.bit() | rhs.bit())
    }
}

impl BitOr<KindSet> for ArtifactKind {
    type Output = KindSet;

    fn bitor(self, rhs: KindSet) -> KindSet {
        KindSet(self.bit() | rhs.0)
    }
}

impl FromIterator<ArtifactKind> for KindSet {
    fn from_iter<I: IntoIterator<Item = ArtifactKind>>(iter: I) -> Self {
        iter.into_iter().fold(KindSet::EMPTY, |set, kind| set | kind)
    }
}

impl fmt::Display for KindSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for kind in self.iter() {
            if !first {
                f.write_str("|")?;
            }
            write!(f, "{kind}")?;
            first = false;
        }
        if first {
            f.write_str("(none)")?;
        }
        Ok(())
    }
}
