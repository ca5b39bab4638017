// Dialect version bucketing for engine selection
//
// Engine builds are published per dialect binary series, not per exact
// dialect version. A caller-supplied version string is mapped onto the small
// closed set of keys below, and everything downstream (pin lookup, artifact
// coordinates) works in terms of the key.

use crate::error::{BridgeError, Result};

/// Internal bucket identifying which pinned engine/dialect version pair to
/// use. Produced only by [`DialectKey::resolve`]; never constructed from
/// metadata or artifacts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DialectKey {
    /// The 2.12 binary series.
    Dialect212,
    /// The 2.13 binary series.
    Dialect213,
    /// The 3.x long-term-support series (3.0 through 3.3).
    Dialect3Lts,
    /// The current 3.x series past LTS.
    Dialect3Next,
}

impl DialectKey {
    /// Map a free-form dialect version string onto a key.
    ///
    /// Rules are evaluated in priority order: the most specific prefix wins,
    /// and a bare `3` prefix only matches once the LTS prefixes have been
    /// ruled out. Anything else is rejected before any I/O happens.
    pub fn resolve(requested_version: &str) -> Result<DialectKey> {
        if requested_version.starts_with("2.12") {
            Ok(DialectKey::Dialect212)
        } else if requested_version.starts_with("2.13") {
            Ok(DialectKey::Dialect213)
        } else if requested_version.starts_with("3.0")
            || requested_version.starts_with("3.1")
            || requested_version.starts_with("3.2")
            || requested_version.starts_with("3.3")
        {
            Ok(DialectKey::Dialect3Lts)
        } else if requested_version.starts_with('3') {
            Ok(DialectKey::Dialect3Next)
        } else {
            Err(BridgeError::UnsupportedVersion {
                version: requested_version.to_string(),
                supported_series: Self::supported_series(),
            })
        }
    }

    /// The version-table key holding this bucket's pinned dialect version.
    pub fn metadata_key(&self) -> &'static str {
        match self {
            DialectKey::Dialect212 => "dialect212",
            DialectKey::Dialect213 => "dialect213",
            DialectKey::Dialect3Lts => "dialect3LTS",
            DialectKey::Dialect3Next => "dialect3Next",
        }
    }

    /// Get all dialect keys
    pub fn all() -> Vec<DialectKey> {
        vec![
            DialectKey::Dialect212,
            DialectKey::Dialect213,
            DialectKey::Dialect3Lts,
            DialectKey::Dialect3Next,
        ]
    }

    fn supported_series() -> Vec<String> {
        vec!["2.12".to_string(), "2.13".to_string(), "3".to_string()]
    }
}

impl std::fmt::Display for DialectKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            DialectKey::Dialect212 => "2.12",
            DialectKey::Dialect213 => "2.13",
            DialectKey::Dialect3Lts => "3 LTS",
            DialectKey::Dialect3Next => "3 Next",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_212_series() {
        for version in ["2.12", "2.12.20", "2.12.0-RC1"] {
            assert_eq!(DialectKey::resolve(version).unwrap(), DialectKey::Dialect212);
        }
    }

    #[test]
    fn test_213_series() {
        for version in ["2.13", "2.13.16", "2.13.99"] {
            assert_eq!(DialectKey::resolve(version).unwrap(), DialectKey::Dialect213);
        }
    }

    #[test]
    fn test_3_lts_series() {
        for version in ["3.0.2", "3.1.0", "3.2.2", "3.3", "3.3.4"] {
            assert_eq!(DialectKey::resolve(version).unwrap(), DialectKey::Dialect3Lts);
        }
    }

    #[test]
    fn test_3_next_series() {
        for version in ["3", "3.4.0", "3.6.3", "3.9.9-RC2"] {
            assert_eq!(
                DialectKey::resolve(version).unwrap(),
                DialectKey::Dialect3Next
            );
        }
    }

    #[test]
    fn test_unsupported_versions() {
        for version in ["2.11", "2.11.12", "2.10", "4.0.0", "1.0", "", "abc"] {
            let error = DialectKey::resolve(version).unwrap_err();
            match error {
                BridgeError::UnsupportedVersion {
                    version: reported, ..
                } => assert_eq!(reported, version),
                other => panic!("expected UnsupportedVersion, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_metadata_keys_are_distinct() {
        let keys: Vec<&str> = DialectKey::all()
            .iter()
            .map(|k| k.metadata_key())
            .collect();
        let mut deduped = keys.clone();
        deduped.dedup();
        assert_eq!(keys, deduped);
        assert_eq!(keys.len(), 4);
    }
}
