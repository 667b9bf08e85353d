use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use sos_msgbin::StringTableReader;
use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::info;

use super::files::{collect_inputs, create_output, create_output_dir, output_path, BIN_EXTENSION};
use super::DocumentFormat;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input message bin file, or a directory of them
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// A target directory for the documents
    #[arg(value_name = "OUTPUT_DIR")]
    output: PathBuf,

    /// Document format to write
    #[arg(short, long, value_enum, default_value_t)]
    format: DocumentFormat,

    /// Allow overwriting existing documents
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let files = collect_inputs(&self.input, BIN_EXTENSION)?;
        create_output_dir(&self.output)?;

        for file in files {
            self.extract_file(&file)
                .with_context(|| format!("extracting from {}", file.display()))?;
        }

        Ok(())
    }

    fn extract_file(&self, file: &Path) -> Result<()> {
        let target = output_path(&self.output, file, self.format.extension())?;
        info!("extracting {} to {}", file.display(), target.display());

        let bin = StringTableReader::new(File::open(file).into_diagnostic()?)?;
        info!("{} entries", bin.len());

        let document = self.format.render(bin.table())?;

        let mut out = create_output(&target, self.overwrite)?;
        out.write_all(&document)
            .into_diagnostic()
            .context(format!("writing {}", target.display()))?;

        Ok(())
    }
}
