//! Dataset inspection helpers: class names from dataset meta files and
//! label statistics.

use crate::error::{RunsetError, RunsetResult};
use serde_pickle::{DeOptions, HashableValue, Value};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Where a dataset keeps its pickled meta file, relative to the data directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetMeta {
    pub name: &'static str,
    pub relative_path: &'static str,
    /// Label list to prefer when the meta file carries several.
    pub label_key: &'static str,
}

pub const REGISTERED_DATASETS: &[DatasetMeta] = &[
    DatasetMeta { name: "CIFAR10", relative_path: "cifar-10-batches-py/batches.meta", label_key: "label_names" },
    DatasetMeta { name: "CIFAR100", relative_path: "cifar-100-python/meta", label_key: "fine_label_names" },
];

pub fn dataset_meta(dataset: &str) -> RunsetResult<&'static DatasetMeta> {
    REGISTERED_DATASETS
        .iter()
        .find(|meta| meta.name == dataset)
        .ok_or_else(|| RunsetError::UnknownDataset(dataset.to_string()))
}

pub fn meta_path(dataset: &str, data_dir: &Path) -> RunsetResult<PathBuf> {
    Ok(data_dir.join(dataset_meta(dataset)?.relative_path))
}

/// Read the class names of `dataset` from its meta file under `data_dir`.
pub fn load_class_names(dataset: &str, data_dir: &Path) -> RunsetResult<Vec<String>> {
    let meta = dataset_meta(dataset)?;
    let path = data_dir.join(meta.relative_path);
    if !path.is_file() {
        return Err(RunsetError::MetaFileMissing { dataset: dataset.to_string(), path });
    }

    let file = std::fs::File::open(&path)?;
    let value = serde_pickle::value_from_reader(std::io::BufReader::new(file), DeOptions::new().decode_strings())?;
    let names = extract_label_names(&value, Some(meta.label_key)).ok_or(RunsetError::LabelsNotFound(path))?;
    debug!(dataset, classes = names.len(), "loaded class names");
    Ok(names)
}

/// Pull a list of label names out of an unpickled meta dictionary.
///
/// `preferred` wins when present; otherwise the first key (in key order)
/// containing `label` whose value is a list or tuple of strings.
pub fn extract_label_names(value: &Value, preferred: Option<&str>) -> Option<Vec<String>> {
    let Value::Dict(entries) = value else {
        return None;
    };

    if let Some(names) = preferred
        .and_then(|key| entries.iter().find(|(k, _)| key_text(k).as_deref() == Some(key)))
        .and_then(|(_, v)| string_list(v))
    {
        return Some(names);
    }

    entries
        .iter()
        .filter(|(k, _)| key_text(k).is_some_and(|k| k.contains("label")))
        .find_map(|(_, v)| string_list(v))
}

fn key_text(key: &HashableValue) -> Option<String> {
    match key {
        HashableValue::String(s) => Some(s.clone()),
        HashableValue::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
        _ => None,
    }
}

fn string_list(value: &Value) -> Option<Vec<String>> {
    let items = match value {
        Value::List(items) | Value::Tuple(items) => items,
        _ => return None,
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(s) => Some(s.clone()),
            Value::Bytes(b) => Some(String::from_utf8_lossy(b).into_owned()),
            _ => None,
        })
        .collect()
}

/// Count samples per class. Labels are 0-based class ids.
pub fn label_counts<I>(labels: I, num_classes: usize) -> RunsetResult<Vec<u64>>
where
    I: IntoIterator<Item = i64>,
{
    let mut counts = vec![0u64; num_classes];
    for label in labels {
        let slot = usize::try_from(label)
            .ok()
            .and_then(|idx| counts.get_mut(idx))
            .ok_or(RunsetError::LabelOutOfRange { label, num_classes })?;
        *slot += 1;
    }
    Ok(counts)
}

/// Empirical distribution function over a sample.
#[derive(Debug, Clone)]
pub struct DiscreteCdf {
    data: Vec<f64>,
}

impl DiscreteCdf {
    #[must_use]
    pub fn new(mut data: Vec<f64>) -> Self {
        data.sort_by(f64::total_cmp);
        Self { data }
    }

    /// Fraction of samples strictly below `point`. An empty sample yields 0.
    #[must_use]
    pub fn eval(&self, point: f64) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        let below = self.data.partition_point(|x| *x < point);
        below as f64 / self.data.len() as f64
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_pickle::SerOptions;
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn names(list: &[&str]) -> Value {
        Value::List(list.iter().map(|s| Value::String((*s).to_string())).collect())
    }

    fn cifar100_meta() -> Value {
        let mut dict = BTreeMap::new();
        dict.insert(HashableValue::String("coarse_label_names".to_string()), names(&["aquatic_mammals", "fish"]));
        dict.insert(HashableValue::String("fine_label_names".to_string()), names(&["apple", "aquarium_fish", "baby"]));
        Value::Dict(dict)
    }

    #[test]
    fn test_meta_path_for_registered_dataset() {
        let path = meta_path("CIFAR10", Path::new("/data")).unwrap();
        assert_eq!(path, PathBuf::from("/data/cifar-10-batches-py/batches.meta"));
    }

    #[test]
    fn test_unknown_dataset_is_a_configuration_error() {
        let err = meta_path("ImageNet", Path::new("/data")).unwrap_err();
        assert!(matches!(err, RunsetError::UnknownDataset(_)));
    }

    #[test]
    fn test_preferred_label_key_wins() {
        let names = extract_label_names(&cifar100_meta(), Some("fine_label_names")).unwrap();
        assert_eq!(names, vec!["apple", "aquarium_fish", "baby"]);
    }

    #[test]
    fn test_falls_back_to_first_label_like_key() {
        let mut dict = BTreeMap::new();
        dict.insert(HashableValue::Bytes(b"num_vis".to_vec()), Value::I64(3072));
        dict.insert(HashableValue::Bytes(b"label_names".to_vec()), Value::List(vec![Value::Bytes(b"airplane".to_vec())]));
        let names = extract_label_names(&Value::Dict(dict), None).unwrap();
        assert_eq!(names, vec!["airplane"]);
    }

    #[test]
    fn test_no_label_entry() {
        let mut dict = BTreeMap::new();
        dict.insert(HashableValue::String("label_count".to_string()), Value::I64(10));
        assert!(extract_label_names(&Value::Dict(dict), None).is_none());
    }

    #[test]
    fn test_load_class_names_from_pickle_file() {
        let temp = TempDir::new().unwrap();
        let path = meta_path("CIFAR100", temp.path()).unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, serde_pickle::value_to_vec(&cifar100_meta(), SerOptions::new()).unwrap()).unwrap();

        let names = load_class_names("CIFAR100", temp.path()).unwrap();
        assert_eq!(names.len(), 3);
        assert_eq!(names[1], "aquarium_fish");
    }

    #[test]
    fn test_missing_meta_file() {
        let temp = TempDir::new().unwrap();
        let err = load_class_names("CIFAR10", temp.path()).unwrap_err();
        assert!(matches!(err, RunsetError::MetaFileMissing { .. }));
    }

    #[test]
    fn test_label_counts_are_zero_based() {
        let counts = label_counts(vec![0, 1, 1, 2, 0, 0], 3).unwrap();
        assert_eq!(counts, vec![3, 2, 1]);
    }

    #[test]
    fn test_label_counts_reject_out_of_range() {
        assert!(matches!(label_counts(vec![0, 3], 3), Err(RunsetError::LabelOutOfRange { label: 3, .. })));
        assert!(label_counts(vec![-1], 3).is_err());
    }

    #[test]
    fn test_cdf_uses_strictly_less_than() {
        let cdf = DiscreteCdf::new(vec![3.0, 1.0, 2.0, 2.0]);
        assert_eq!(cdf.eval(1.0), 0.0);
        assert_eq!(cdf.eval(2.0), 0.25);
        assert_eq!(cdf.eval(2.5), 0.75);
        assert_eq!(cdf.eval(10.0), 1.0);
        assert_eq!(DiscreteCdf::new(vec![]).eval(1.0), 0.0);
    }
}
