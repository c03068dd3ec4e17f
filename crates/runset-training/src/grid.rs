//! Page layout for labelled image grids.
//!
//! Images are laid out row-major, `nrows * ncols` per page. Page `n` is saved
//! as `<savepath>_<n>.png`. Drawing the pixels is left to the caller.

use crate::error::{RunsetError, RunsetResult};
use serde::Serialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCell {
    pub image_index: usize,
    pub row: usize,
    pub col: usize,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridPage {
    pub path: PathBuf,
    pub cells: Vec<GridCell>,
}

pub fn page_path(savepath: &Path, page: usize) -> PathBuf {
    let mut name = savepath.as_os_str().to_owned();
    name.push(format!("_{page}.png"));
    PathBuf::from(name)
}

/// Assign each image to a page and cell, titled with its class name.
pub fn plan_label_grids(
    labels: &[i64],
    classes: &[String],
    nrows: usize,
    ncols: usize,
    savepath: &Path,
) -> RunsetResult<Vec<GridPage>> {
    if nrows == 0 || ncols == 0 {
        return Err(RunsetError::InvalidSpec(format!("grid must have at least one cell, got {nrows}x{ncols}")));
    }
    let grid = nrows * ncols;

    let mut pages: Vec<GridPage> = Vec::with_capacity(labels.len().div_ceil(grid));
    for (idx, &label) in labels.iter().enumerate() {
        let title = usize::try_from(label)
            .ok()
            .and_then(|i| classes.get(i))
            .ok_or(RunsetError::LabelOutOfRange { label, num_classes: classes.len() })?;

        let page = idx / grid;
        if pages.len() == page {
            pages.push(GridPage { path: page_path(savepath, page), cells: Vec::with_capacity(grid) });
        }
        let pos = idx % grid;
        pages[page].cells.push(GridCell { image_index: idx, row: pos / ncols, col: pos % ncols, title: title.clone() });
    }
    Ok(pages)
}
