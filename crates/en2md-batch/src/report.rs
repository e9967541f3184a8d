//! Run report

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Serialize, Serializer};

use crate::graph::{LinkMap, RootAnalysis};
use crate::{BatchError, Mode, Result};

/// A note that was converted
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConvertedNote {
    /// Name relative to the export directory
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Output file (computed even for dry runs)
    pub output: PathBuf,
    /// Linked notes, relative to the export directory
    pub links: Vec<String>,
    /// Number of recovered problems reported by the converter
    pub warnings: usize,
    /// Resources that could not be copied
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub missing_resources: Vec<String>,
}

/// A note that failed to convert
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Failure {
    pub name: String,
    pub message: String,
}

/// Summary of a batch run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub mode: Mode,
    pub converted: Vec<ConvertedNote>,
    pub failures: Vec<Failure>,
    /// Notes of the directory never reached (recursive mode)
    pub missing_files: Vec<String>,
    /// Link targets outside the converted set
    pub missing_links: Vec<String>,
    pub roots: RootAnalysis,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
}

fn serialize_secs<S: Serializer>(elapsed: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_f64(elapsed.as_secs_f64())
}

impl RunReport {
    pub fn new(mode: Mode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub(crate) fn record(&mut self, name: &str, outcome: Result<ConvertedNote>) {
        match outcome {
            Ok(note) => self.converted.push(note),
            Err(e) => {
                log::error!("Error converting {name}: {e}");
                self.failures.push(Failure {
                    name: name.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }

    /// Whether a note of this name was converted
    pub fn is_converted(&self, name: &str) -> bool {
        self.converted.iter().any(|n| n.name == name)
    }

    /// Outgoing links of every converted note
    pub fn link_map(&self) -> LinkMap {
        self.converted
            .iter()
            .map(|n| (n.name.clone(), n.links.clone()))
            .collect()
    }

    /// Serialize the report to a JSON string
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| BatchError::Io(std::io::Error::other(e)))
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.failures.is_empty() {
            writeln!(f, "\nFailed files:\n-------------")?;
            for failure in &self.failures {
                writeln!(f, "{}: {}", failure.name, failure.message)?;
            }
        }

        if self.mode == Mode::Recursive {
            writeln!(f, "\nMissing files:\n--------------")?;
            for name in &self.missing_files {
                writeln!(f, "{name}")?;
            }
        }

        if self.mode != Mode::Single {
            writeln!(f, "\nMissing links:\n--------------")?;
            for name in &self.missing_links {
                writeln!(f, "{name}")?;
            }
        }

        if self.mode == Mode::All {
            writeln!(f, "\nRoot files:\n-----------")?;
            match &self.roots {
                RootAnalysis::Islands(islands) => {
                    for island in islands {
                        writeln!(f, "{}", island.label())?;
                    }
                }
                RootAnalysis::Unavailable => writeln!(f, "(link graph analysis unavailable)")?,
                RootAnalysis::Skipped => {}
            }
        }

        write!(
            f,
            "Converted {} files in {:.3} seconds.",
            self.converted.len(),
            self.elapsed.as_secs_f64()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Island;

    fn note(name: &str, links: &[&str]) -> ConvertedNote {
        ConvertedNote {
            name: name.to_string(),
            title: None,
            output: PathBuf::from(name).with_extension("md"),
            links: links.iter().map(|s| s.to_string()).collect(),
            warnings: 0,
            missing_resources: Vec::new(),
        }
    }

    fn sample() -> RunReport {
        RunReport {
            mode: Mode::All,
            converted: vec![note("A.html", &["B.html", "C.html"]), note("B.html", &[])],
            failures: vec![Failure {
                name: "D.html".to_string(),
                message: "Input file not found: D.html".to_string(),
            }],
            missing_files: Vec::new(),
            missing_links: vec!["C.html".to_string()],
            roots: RootAnalysis::Islands(vec![Island {
                members: vec!["A.html".to_string(), "B.html".to_string()],
                roots: vec!["A.html".to_string()],
            }]),
            elapsed: Duration::from_millis(1500),
        }
    }

    #[test]
    fn test_text_report() {
        insta::assert_snapshot!(sample().to_string().trim_start(), @r"
        Failed files:
        -------------
        D.html: Input file not found: D.html

        Missing links:
        --------------
        C.html

        Root files:
        -----------
        A.html
        Converted 2 files in 1.500 seconds.
        ");
    }

    #[test]
    fn test_json_report() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();
        assert_eq!(json["mode"], "all");
        assert_eq!(json["elapsed_secs"], 1.5);
        assert_eq!(json["roots"]["status"], "islands");
        assert_eq!(json["roots"]["islands"][0]["roots"][0], "A.html");
        assert_eq!(json["converted"][0]["links"][1], "C.html");
        assert!(json["converted"][0].get("title").is_none());
    }

    #[test]
    fn test_link_map() {
        let report = sample();
        let links = report.link_map();
        assert_eq!(links["A.html"], vec!["B.html", "C.html"]);
        assert!(report.is_converted("B.html"));
        assert!(!report.is_converted("D.html"));
    }
}
