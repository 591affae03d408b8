//! Engine metadata lookup (spec §9's supplemented `latest` keyword and
//! `pack.mcmeta`'s `pack_format` field).
//!
//! `original_source/src/compiler.py` resolves `MinecraftVersion.latest` by
//! fetching Mojang's version manifest at import time and resolves
//! `pack_format` from a bundled table keyed by version. The live fetch is
//! explicitly out of scope (spec §1 permits stubbing it); this module keeps
//! the same two-operation shape — resolve "latest", look up a format number
//! — behind a trait so a networked provider could be swapped in later
//! without touching [`crate::session::Session`].

use crate::config::EngineVersion;

/// Supplies the two pieces of engine metadata the driver needs but the
/// compiler itself has no opinion about.
pub trait VersionInfoProvider {
    /// The concrete version `latest` currently resolves to.
    fn latest(&self) -> EngineVersion;

    /// The `pack_format` integer `pack.mcmeta` should carry for `version`,
    /// or `None` if the version isn't recognized.
    fn pack_format(&self, version: &EngineVersion) -> Option<u32>;
}

/// A fixed, offline table covering well-known releases. Good enough for
/// the versions this compiler's output actually targets; unrecognized
/// versions fall back to the newest entry not newer than `version`.
pub struct StaticVersionInfoProvider {
    table: Vec<(EngineVersion, u32)>,
    latest: EngineVersion,
}

impl StaticVersionInfoProvider {
    pub fn new() -> Self {
        let table = vec![
            (EngineVersion::new(1, 14, 0), 4),
            (EngineVersion::new(1, 15, 0), 5),
            (EngineVersion::new(1, 16, 0), 5),
            (EngineVersion::new(1, 16, 2), 6),
            (EngineVersion::new(1, 17, 0), 7),
            (EngineVersion::new(1, 18, 0), 8),
            (EngineVersion::new(1, 18, 2), 9),
            (EngineVersion::new(1, 19, 0), 10),
            (EngineVersion::new(1, 19, 3), 12),
            (EngineVersion::new(1, 19, 4), 13),
            (EngineVersion::new(1, 20, 0), 15),
            (EngineVersion::new(1, 20, 2), 18),
            (EngineVersion::new(1, 20, 3), 26),
        ];
        let latest = table.last().expect("table is non-empty").0;
        StaticVersionInfoProvider { table, latest }
    }
}

impl Default for StaticVersionInfoProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionInfoProvider for StaticVersionInfoProvider {
    fn latest(&self) -> EngineVersion {
        self.latest
    }

    fn pack_format(&self, version: &EngineVersion) -> Option<u32> {
        let key = (version.major, version.minor, version.patch);
        if key < (self.table[0].0.major, self.table[0].0.minor, self.table[0].0.patch) {
            return None;
        }
        self.table
            .iter()
            .rev()
            .find(|(entry, _)| (entry.major, entry.minor, entry.patch) <= key)
            .map(|(_, format)| *format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match_returns_its_format() {
        let provider = StaticVersionInfoProvider::new();
        assert_eq!(provider.pack_format(&EngineVersion::new(1, 19, 4)), Some(13));
    }

    #[test]
    fn unlisted_patch_falls_back_to_nearest_older_entry() {
        let provider = StaticVersionInfoProvider::new();
        assert_eq!(provider.pack_format(&EngineVersion::new(1, 19, 1)), Some(10));
    }

    #[test]
    fn below_earliest_entry_is_unrecognized() {
        let provider = StaticVersionInfoProvider::new();
        assert_eq!(provider.pack_format(&EngineVersion::new(1, 13, 0)), None);
    }

    #[test]
    fn latest_is_the_newest_table_entry() {
        let provider = StaticVersionInfoProvider::new();
        assert_eq!(provider.latest(), EngineVersion::new(1, 20, 3));
    }
}
