//! GSQL server versions this client can impersonate.
//!
//! The server checks the `clientCommit` fingerprint against its own build;
//! the table is tried in the order listed here and the first accepted entry
//! wins, so the order is part of the protocol behavior.

/// One negotiable (version label, client build fingerprint) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionEntry {
    /// Server version label, e.g. `3.6.2`.
    pub version: &'static str,
    /// 40-character lowercase hex client build fingerprint.
    pub commit: &'static str,
}

const fn entry(version: &'static str, commit: &'static str) -> VersionEntry {
    VersionEntry { version, commit }
}

/// Ordered version compatibility table.
pub const VERSION_TABLE: &[VersionEntry] = &[
    entry("3.6.2", "31716aa98a0d4bd3bd7c5488dfc795a82dfee80d"),
    entry("3.6.1", "b77b8fc6c2ceadd457571fc0a6ce1fb243e5f31c"),
    entry("3.6.0", "b77b8fc6c2ceadd457571fc0a6ce1fb243e5f31c"),
    entry("3.5.3", "7edb256d9750ab4451d27eef605e58e9adcedc7a"),
    entry("3.5.0", "375e661f96298db4df018037949827e16ee8df60"),
    entry("3.4.0", "421b0740e4a9f61d6eb0e03a4d2079de625a3ffe"),
    entry("3.3.0", "90cc0512851acca2be10044878815bc414876f23"),
    entry("3.2.2", "a31220261f440f61ebf3edfb1a84efba62939177"),
    entry("3.2.1", "986e09c5d17d303659bed1342506a1c458462e30"),
    entry("3.2.0", "f451d8a9a66c7ca0d8d4d9046f440f21097cdd03"),
    entry("3.1.6", "71b39b25e198f690e28113e7f8874dab7b4559ec"),
    entry("3.1.5", "f91c690f375ecd4d600eb126ca5a920a5c9ad0f4"),
    entry("3.1.2", "3887cbd1d67b58ba6f88c50a069b679e20743984"),
    entry("3.1.1", "375a182bc03b0c78b489e18a0d6af222916a48d2"),
    entry("3.1.0", "e9d3c5d98e7229118309f6d4bbc9446bad7c4c3d"),
    entry("3.0.5", "a9f902e5c552780589a15ba458adb48984359165"),
    entry("3.0.0", "c90ec746a7e77ef5b108554be2133dfd1e1ab1b2"),
];

/// Look up the fingerprint for a version label.
#[must_use]
pub fn commit_for(version: &str) -> Option<&'static str> {
    VERSION_TABLE
        .iter()
        .find(|e| e.version == version)
        .map(|e| e.commit)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn table_has_seventeen_entries() {
        assert_eq!(VERSION_TABLE.len(), 17);
    }

    #[test]
    fn fingerprints_are_forty_lowercase_hex_chars() {
        for e in VERSION_TABLE {
            assert_eq!(e.commit.len(), 40, "{}", e.version);
            assert!(
                e.commit
                    .chars()
                    .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)),
                "{} has non-hex fingerprint",
                e.version
            );
        }
    }

    #[test]
    fn version_labels_are_unique() {
        let mut labels: Vec<_> = VERSION_TABLE.iter().map(|e| e.version).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), VERSION_TABLE.len());
    }

    #[test]
    fn newest_version_is_tried_first() {
        assert_eq!(VERSION_TABLE[0].version, "3.6.2");
        assert_eq!(VERSION_TABLE[VERSION_TABLE.len() - 1].version, "3.0.0");
    }

    #[test_case("3.6.2", Some("31716aa98a0d4bd3bd7c5488dfc795a82dfee80d") ; "latest")]
    #[test_case("3.6.0", Some("b77b8fc6c2ceadd457571fc0a6ce1fb243e5f31c") ; "shared fingerprint")]
    #[test_case("3.0.0", Some("c90ec746a7e77ef5b108554be2133dfd1e1ab1b2") ; "oldest")]
    #[test_case("2.9.0", None ; "unknown")]
    fn commit_lookup(version: &str, expected: Option<&str>) {
        assert_eq!(commit_for(version), expected);
    }
}
