use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::AnalyzerError;
use crate::log_parser;
use crate::result::FileResult;

/// Name of the grand-parent directory, the experiment type in an
/// `<experiment>/<run>/locust.log` layout.
pub fn experiment_directory(filename: &str) -> Option<String> {
    Path::new(filename)
        .parent()
        .and_then(|run| run.parent())
        .and_then(|experiment| experiment.file_name())
        .map(|name| name.to_string_lossy().into_owned())
}

/// An input log together with an optional grouping hint for its label.
#[derive(PartialEq, Debug, Clone)]
pub struct Source {
    pub filename: String,
    pub grouping_hint: Option<String>,
}

impl Source {
    pub fn new(filename: &str) -> Source {
        Source {
            filename: filename.to_string(),
            grouping_hint: None,
        }
    }

    /// Uses the experiment directory as hint.
    pub fn with_directory_hint(filename: &str) -> Source {
        Source {
            filename: filename.to_string(),
            grouping_hint: experiment_directory(filename),
        }
    }

    pub fn base_label(&self) -> String {
        if let Some(ref hint) = self.grouping_hint {
            return hint.clone();
        }

        if self.filename == "-" {
            return String::from("stdin");
        }

        let name = Path::new(&self.filename)
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.filename.clone());
        let name = name.trim_end_matches(".gz");

        Path::new(name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| name.to_string())
    }
}

/// First occurrence keeps its label, the n-th repetition becomes `<label>-n`.
/// Suffixes already taken by another label are skipped.
pub fn assign_labels<I>(base_labels: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();

    base_labels
        .into_iter()
        .map(|label| {
            let mut assigned = label.clone();
            let suffix = next_suffix.entry(label.clone()).or_insert(1);

            while taken.contains(&assigned) {
                assigned = format!("{}-{}", label, suffix);
                *suffix += 1;
            }

            taken.insert(assigned.clone());
            assigned
        })
        .collect()
}

/// Classifies every source independently, in input order. The first
/// unreadable source aborts the run.
pub fn analyze_files(sources: &[Source]) -> Result<Vec<FileResult>, AnalyzerError> {
    let labels = assign_labels(sources.iter().map(Source::base_label));

    sources
        .iter()
        .zip(labels)
        .map(|(source, label)| {
            info!("Parsing log file {} as '{}'", source.filename, label);

            Ok(FileResult {
                source: source.filename.clone(),
                label,
                result: log_parser::parse_file(&source.filename)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn test_base_label_from_file_name() {
        assert_eq!(Source::new("runs/a/locust.log").base_label(), "locust");
        assert_eq!(Source::new("runs/a/locust.log.gz").base_label(), "locust");
        assert_eq!(Source::new("baseline").base_label(), "baseline");
        assert_eq!(Source::new("-").base_label(), "stdin");
    }

    #[test]
    fn test_base_label_from_directory_hint() {
        let source = Source::with_directory_hint("results/autoscaling/run-3/locust.log");

        assert_eq!(source.grouping_hint, Some(String::from("autoscaling")));
        assert_eq!(source.base_label(), "autoscaling");
    }

    #[test]
    fn test_experiment_directory() {
        assert_eq!(
            experiment_directory("results/autoscaling/run-3/locust.log"),
            Some(String::from("autoscaling"))
        );
        assert_eq!(experiment_directory("run-3/locust.log"), None);
        assert_eq!(experiment_directory("locust.log"), None);
        assert_eq!(experiment_directory("-"), None);
    }

    #[test]
    fn test_directory_hint_falls_back_to_file_name() {
        let source = Source::with_directory_hint("run-3/locust.log");

        assert_eq!(source.grouping_hint, None);
        assert_eq!(source.base_label(), "locust");
    }

    #[test]
    fn test_assign_labels_suffixes_collisions() {
        let labels = assign_labels(vec![
            String::from("locust"),
            String::from("baseline"),
            String::from("locust"),
            String::from("locust"),
            String::from("baseline"),
        ]);

        assert_eq!(
            labels,
            vec!["locust", "baseline", "locust-1", "locust-2", "baseline-1"]
        );
    }

    #[test]
    fn test_assign_labels_skips_taken_suffixes() {
        let labels = assign_labels(vec![
            String::from("a"),
            String::from("a"),
            String::from("a-1"),
        ]);

        assert_eq!(labels, vec!["a", "a-1", "a-1-1"]);

        let labels = assign_labels(vec![
            String::from("a"),
            String::from("a-1"),
            String::from("a"),
        ]);

        assert_eq!(labels, vec!["a", "a-1", "a-2"]);
    }

    #[test]
    fn test_assign_labels_unique() {
        let labels = assign_labels(vec![String::from("a"), String::from("b")]);

        assert_eq!(labels, vec!["a", "b"]);
    }

    #[test]
    fn test_analyze_files_keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        for experiment in &["scaling", "baseline"] {
            let run = dir.path().join(experiment).join("run-1");
            fs::create_dir_all(&run).unwrap();
            fs::copy("src/test/locust-1.log", run.join("locust.log")).unwrap();
        }
        let path = |experiment: &str| {
            dir.path()
                .join(experiment)
                .join("run-1")
                .join("locust.log")
                .to_string_lossy()
                .into_owned()
        };

        let sources = vec![
            Source::with_directory_hint(&path("scaling")),
            Source::with_directory_hint(&path("baseline")),
            Source::with_directory_hint(&path("scaling")),
        ];

        let results = analyze_files(&sources).unwrap();

        let labels: Vec<&str> = results.iter().map(|file| file.label.as_str()).collect();
        assert_eq!(labels, vec!["scaling", "baseline", "scaling-1"]);
        assert_eq!(results[1].source, path("baseline"));
        assert!(results.iter().all(|file| file.result.total_requests() == 6));
    }

    #[test]
    fn test_analyze_files_missing_file_is_fatal() {
        let sources = vec![
            Source::new("src/test/locust-1.log"),
            Source::new("src/test/missing.log"),
        ];

        assert!(analyze_files(&sources).is_err());
    }
}
