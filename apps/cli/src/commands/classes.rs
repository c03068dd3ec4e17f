//! Classes command implementation.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ClassesArgs {
    /// Dataset name (CIFAR10 or CIFAR100)
    #[arg(long)]
    pub dataset: String,

    /// Parent directory for the dataset
    #[arg(long = "data_dir", default_value = "./data/")]
    pub data_dir: PathBuf,

    /// Output the class names as a JSON array
    #[arg(long)]
    pub json: bool,
}

pub fn execute(args: &ClassesArgs) -> Result<()> {
    let names = runset_training::load_class_names(&args.dataset, &args.data_dir)
        .with_context(|| format!("Failed to read class names for dataset {}", args.dataset))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&names)?);
        return Ok(());
    }

    println!("{}", format!("{} classes ({})", args.dataset, names.len()).bold().cyan());
    for (idx, name) in names.iter().enumerate() {
        println!("{idx:>4}  {name}");
    }
    Ok(())
}
