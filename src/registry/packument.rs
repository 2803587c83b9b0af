// src/registry/packument.rs

//! Registry document shapes
//!
//! Only the fields the resolver reads are modelled; everything else in a
//! packument is skipped during deserialization.

use super::RawPublishTimes;
use serde::Deserialize;
use serde::de::IgnoredAny;
use std::collections::BTreeMap;

/// Full package document (`GET /{name}`)
#[derive(Debug, Default, Deserialize)]
pub struct Packument {
    /// Mostly strings, but unpublished packages carry an object under
    /// `time.unpublished`
    #[serde(default)]
    pub time: BTreeMap<String, serde_json::Value>,
}

impl Packument {
    /// The `time` map restricted to string timestamps
    pub fn publish_times(&self) -> RawPublishTimes {
        self.time
            .iter()
            .filter_map(|(key, value)| value.as_str().map(|ts| (key.clone(), ts.to_string())))
            .collect()
    }
}

/// Abbreviated install document
/// (`Accept: application/vnd.npm.install-v1+json`)
#[derive(Debug, Default, Deserialize)]
pub struct AbbreviatedPackument {
    #[serde(default)]
    pub versions: BTreeMap<String, IgnoredAny>,
}

impl AbbreviatedPackument {
    pub fn version_list(&self) -> Vec<String> {
        self.versions.keys().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_times_skips_non_strings() {
        let doc: Packument = serde_json::from_str(
            r#"{
                "name": "gone",
                "versions": {},
                "time": {
                    "created": "2015-01-01T00:00:00.000Z",
                    "1.0.0": "2015-01-02T00:00:00.000Z",
                    "unpublished": { "time": "2016-01-01T00:00:00.000Z" }
                }
            }"#,
        )
        .unwrap();

        let times = doc.publish_times();
        assert_eq!(times.len(), 2);
        assert_eq!(times["1.0.0"], "2015-01-02T00:00:00.000Z");
        assert!(!times.contains_key("unpublished"));
    }

    #[test]
    fn test_abbreviated_versions() {
        let doc: AbbreviatedPackument = serde_json::from_str(
            r#"{
                "name": "x",
                "dist-tags": { "latest": "1.1.0" },
                "versions": {
                    "1.0.0": { "dist": { "tarball": "https://example.com/x-1.0.0.tgz" } },
                    "1.1.0": { "dist": { "tarball": "https://example.com/x-1.1.0.tgz" } }
                }
            }"#,
        )
        .unwrap();

        assert_eq!(doc.version_list(), vec!["1.0.0", "1.1.0"]);
    }
}
