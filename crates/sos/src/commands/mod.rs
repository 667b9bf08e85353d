pub mod extract;
pub mod files;
pub mod pack;

use clap::ValueEnum;
use sos_msgbin::{error::Result, json, xml, Table};
use std::io::Read;

/// Editable document form a table is extracted to or packed from
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum DocumentFormat {
    #[default]
    Xml,
    Json,
}

impl DocumentFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            DocumentFormat::Xml => "xml",
            DocumentFormat::Json => "json",
        }
    }

    /// Render the whole document before anything touches the output file
    pub fn render(self, table: &Table) -> Result<Vec<u8>> {
        match self {
            DocumentFormat::Xml => xml::write_xml(table, Vec::new()),
            DocumentFormat::Json => Ok(json::to_json(table)?.into_bytes()),
        }
    }

    pub fn read(self, mut input: impl Read) -> Result<Table> {
        match self {
            DocumentFormat::Xml => xml::read_xml(input),
            DocumentFormat::Json => {
                let mut document = String::new();
                input.read_to_string(&mut document)?;
                json::from_json(&document)
            }
        }
    }
}

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Decode message bin files into editable documents
    Extract(extract::ExtractArgs),
    /// Encode editable documents back into message bin files
    Pack(pack::PackArgs),
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Extract(extract) => extract.handle(),
            Commands::Pack(pack) => pack.handle(),
        }
    }
}
