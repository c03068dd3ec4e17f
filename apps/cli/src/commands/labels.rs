//! Labels command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use runset_training::{label_counts, load_class_names, plan_label_grids, DiscreteCdf, GridPage};
use serde_json::json;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct LabelsArgs {
    /// JSON file holding an array of integer labels
    #[arg(long)]
    pub labels: PathBuf,

    /// Dataset whose meta file supplies the class names (CIFAR10 or CIFAR100)
    #[arg(long, required_unless_present = "num_classes", conflicts_with = "num_classes")]
    pub dataset: Option<String>,

    /// Number of classes when no dataset meta file is available
    #[arg(long)]
    pub num_classes: Option<usize>,

    /// Parent directory for the dataset
    #[arg(long = "data_dir", default_value = "./data/")]
    pub data_dir: PathBuf,

    /// Plan labelled image grids saved as `<savepath>_<n>.png`
    #[arg(long)]
    pub savepath: Option<PathBuf>,

    /// Grid rows per page
    #[arg(long, default_value_t = 4)]
    pub grid_rows: usize,

    /// Grid columns per page
    #[arg(long, default_value_t = 4)]
    pub grid_cols: usize,

    /// Output the histogram (and grid plan) as JSON
    #[arg(long)]
    pub json: bool,
}

/// One histogram row: class count and the fraction of labels at or below it.
#[derive(Debug, Clone, PartialEq)]
struct ClassRow {
    index: usize,
    name: String,
    count: u64,
    cumulative: f64,
}

fn class_rows(labels: &[i64], names: &[String]) -> Result<Vec<ClassRow>> {
    let counts = label_counts(labels.iter().copied(), names.len())?;
    let cdf = DiscreteCdf::new(labels.iter().map(|&l| l as f64).collect());
    Ok(names
        .iter()
        .zip(counts)
        .enumerate()
        .map(|(index, (name, count))| ClassRow {
            index,
            name: name.clone(),
            count,
            cumulative: cdf.eval((index + 1) as f64),
        })
        .collect())
}

pub fn execute(args: &LabelsArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.labels)
        .with_context(|| format!("Failed to read labels file {}", args.labels.display()))?;
    let labels: Vec<i64> = serde_json::from_str(&raw)
        .with_context(|| format!("Labels file {} must hold a JSON array of integers", args.labels.display()))?;

    let names = match (&args.dataset, args.num_classes) {
        (Some(dataset), _) => load_class_names(dataset, &args.data_dir)
            .with_context(|| format!("Failed to read class names for dataset {dataset}"))?,
        (None, Some(n)) => (0..n).map(|i| i.to_string()).collect(),
        (None, None) => anyhow::bail!("Either --dataset or --num-classes is required"),
    };

    let rows = class_rows(&labels, &names)?;
    let pages: Vec<GridPage> = match &args.savepath {
        Some(savepath) => plan_label_grids(&labels, &names, args.grid_rows, args.grid_cols, savepath)?,
        None => Vec::new(),
    };

    if args.json {
        let classes: Vec<_> = rows
            .iter()
            .map(|row| json!({"index": row.index, "name": row.name, "count": row.count, "cumulative": row.cumulative}))
            .collect();
        let output = json!({"total": labels.len(), "classes": classes, "pages": pages});
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("{}", format!("{} labels over {} classes", labels.len(), names.len()).bold().cyan());
    for row in &rows {
        println!("{:>4}  {:<16} {:>8}  {:>6.3}", row.index, row.name, row.count, row.cumulative);
    }
    if !pages.is_empty() {
        println!();
        println!("{}", format!("{} grid pages", pages.len()).bold());
        for page in &pages {
            println!("  {} ({} images)", page.path.display(), page.cells.len());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(n: usize) -> Vec<String> {
        (0..n).map(|i| i.to_string()).collect()
    }

    #[test]
    fn test_class_rows_count_and_accumulate() {
        let rows = class_rows(&[0, 1, 1, 2], &names(3)).unwrap();

        let counts: Vec<_> = rows.iter().map(|r| r.count).collect();
        assert_eq!(counts, vec![1, 2, 1]);
        assert!((rows[0].cumulative - 0.25).abs() < f64::EPSILON);
        assert!((rows[1].cumulative - 0.75).abs() < f64::EPSILON);
        assert!((rows[2].cumulative - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_class_rows_reject_out_of_range_label() {
        assert!(class_rows(&[0, 3], &names(3)).is_err());
    }
}
