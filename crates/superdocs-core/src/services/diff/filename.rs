use strsim::levenshtein;

use super::similarity::ratio;
use super::types::FileSet;

#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The stated path refers to a known file.
    Existing { filepath: String, similarity: f64 },
    /// Nothing close enough is known: the edit creates this file.
    New { filepath: String },
}

impl Resolution {
    pub fn filepath(&self) -> &str {
        match self {
            Self::Existing { filepath, .. } | Self::New { filepath } => filepath,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, Self::New { .. })
    }
}

/// Known path with the smallest edit distance to `stated`; the first one wins ties.
pub fn closest_filepath<'a>(stated: &str, files: &'a FileSet) -> Option<&'a str> {
    files
        .filepaths()
        .map(|candidate| (levenshtein(stated, candidate), candidate))
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate)
}

/// Maps a path as written by the model onto a known file, or flags it as new
/// when even the closest known path is less similar than `threshold`.
pub fn resolve_filepath(stated: &str, files: &FileSet, threshold: f64) -> Resolution {
    if files.get(stated).is_some() {
        return Resolution::Existing {
            filepath: stated.to_string(),
            similarity: 1.0,
        };
    }

    let Some(closest) = closest_filepath(stated, files) else {
        return Resolution::New {
            filepath: stated.to_string(),
        };
    };

    let similarity = ratio(stated, closest);
    if similarity < threshold {
        tracing::debug!(
            "{} is not close to any known file (best {} at {:.2}), treating as new",
            stated,
            closest,
            similarity
        );
        Resolution::New {
            filepath: stated.to_string(),
        }
    } else {
        Resolution::Existing {
            filepath: closest.to_string(),
            similarity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::diff::config::NEW_FILE_THRESHOLD;

    fn known_files() -> FileSet {
        [("src/app.ts", "app"), ("src/util.ts", "util")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_resolve_filepath() {
        let files = known_files();
        let test_cases = vec![
            ("src/app.ts", Some("src/app.ts")),
            ("app.ts", Some("src/app.ts")),
            ("src/utils.ts", Some("src/util.ts")),
            ("b/src/util.ts", Some("src/util.ts")),
            ("totally/unrelated/file.py", None),
        ];

        for (stated, expected) in test_cases {
            let resolution = resolve_filepath(stated, &files, NEW_FILE_THRESHOLD);
            match expected {
                Some(path) => assert_eq!(
                    resolution.filepath(),
                    path,
                    "Failed for stated path: {}",
                    stated
                ),
                None => {
                    assert!(resolution.is_new(), "Expected new file for: {}", stated);
                    assert_eq!(resolution.filepath(), stated);
                }
            }
        }
    }

    #[test]
    fn test_no_known_files_means_new_file() {
        let resolution = resolve_filepath("new/file.txt", &FileSet::new(), NEW_FILE_THRESHOLD);
        assert_eq!(
            resolution,
            Resolution::New {
                filepath: "new/file.txt".into()
            }
        );
    }

    #[test]
    fn test_closest_prefers_first_on_ties() {
        let files: FileSet = [("a.rs", ""), ("b.rs", "")].into_iter().collect();
        assert_eq!(closest_filepath("c.rs", &files), Some("a.rs"));
    }
}
