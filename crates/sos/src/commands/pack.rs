use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use std::{
    fs::File,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::info;

use super::files::{collect_inputs, create_output, create_output_dir, output_path, BIN_EXTENSION};
use super::DocumentFormat;

#[derive(Args)]
pub struct PackArgs {
    /// An input document, or a directory of them
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// A target directory for the message bin files
    #[arg(value_name = "OUTPUT_DIR")]
    output: PathBuf,

    /// Document format to read
    #[arg(short, long, value_enum, default_value_t)]
    format: DocumentFormat,

    /// Allow overwriting existing message bin files
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl PackArgs {
    pub fn handle(&self) -> Result<()> {
        let files = collect_inputs(&self.input, self.format.extension())?;
        create_output_dir(&self.output)?;

        for file in files {
            self.pack_file(&file)
                .with_context(|| format!("packing from {}", file.display()))?;
        }

        Ok(())
    }

    fn pack_file(&self, file: &Path) -> Result<()> {
        let target = output_path(&self.output, file, BIN_EXTENSION)?;
        info!("packing {} to {}", file.display(), target.display());

        let table = self.format.read(File::open(file).into_diagnostic()?)?;
        let bytes = sos_msgbin::encode(&table)?;
        info!("{} entries, {} bytes", table.count(), bytes.len());

        let mut out = create_output(&target, self.overwrite)?;
        out.write_all(&bytes)
            .into_diagnostic()
            .context(format!("writing {}", target.display()))?;

        Ok(())
    }
}
