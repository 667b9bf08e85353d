//! Input discovery and output placement shared by the commands

use itertools::Itertools;
use miette::{miette, Context, IntoDiagnostic, Result};
use std::{
    ffi::OsStr,
    fs::File,
    path::{Path, PathBuf},
};
use tracing::{debug, warn};
use walkdir::WalkDir;

pub const BIN_EXTENSION: &str = "bin";

/// Resolve `input` to the files to convert.
///
/// A file is taken as is. A directory yields the files directly inside it
/// whose extension matches `extension`, ignoring case, sorted by path.
pub fn collect_inputs(input: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(miette!(
            "{} is neither a file nor a directory",
            input.display()
        ));
    }

    let files = WalkDir::new(input)
        .min_depth(1)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|path| has_extension(path, extension))
        .sorted()
        .collect_vec();

    if files.is_empty() {
        warn!("no .{extension} files found in {}", input.display());
    }
    debug!(count = files.len(), "collected inputs");

    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}

/// `<directory>/<input stem>.<extension>`
pub fn output_path(directory: &Path, input: &Path, extension: &str) -> Result<PathBuf> {
    let mut name = input
        .file_stem()
        .ok_or(miette!("unable to find file stem of {}", input.display()))?
        .to_os_string();
    name.push(".");
    name.push(extension);

    Ok(directory.join(name))
}

pub fn create_output_dir(directory: &Path) -> Result<()> {
    std::fs::create_dir_all(directory)
        .into_diagnostic()
        .context(format!("creating {}", directory.display()))
}

pub fn create_output(path: &Path, overwrite: bool) -> Result<File> {
    if !overwrite {
        File::create_new(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    } else {
        File::create(path)
            .into_diagnostic()
            .context(format!("creating {}", path.display()))
    }
}
