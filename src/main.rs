use std::{
    error::Error,
    io::{self, Write},
    path::{Path, PathBuf},
};

use clap::Parser;
use log::{debug, info};
use pearch::{MachineType, MappedFile, PeHeaderReader};

#[derive(Debug, Parser)]
#[clap(author, version, about = "Print the architecture a PE executable targets", long_about = None)]
struct Arguments {
    /// File to inspect
    #[clap(default_value = r"C:\Windows\Notepad.exe")]
    file: PathBuf,
}

/// Writes the architecture line, or nothing for a machine we do not report.
fn report(machine: MachineType, output: &mut impl Write) -> io::Result<()> {
    match machine.name() {
        Some(name) => writeln!(output, "{}", name),
        None => {
            info!("Unrecognized machine: {}", machine);
            Ok(())
        }
    }
}

fn run(path: &Path, output: &mut impl Write) -> Result<(), Box<dyn Error>> {
    let file = MappedFile::open(path)?;
    let reader = PeHeaderReader::parse(&file)?;

    match reader.optional_header() {
        Ok(optional_header) => debug!(
            "{}, entry point {:#x}, image base {:#x}, subsystem {}",
            if optional_header.is_64bit() { "PE32+" } else { "PE32" },
            optional_header.address_of_entry_point(),
            optional_header.image_base(),
            optional_header.subsystem()
        ),
        Err(err) => debug!("No usable optional header: {}", err),
    }

    report(reader.machine_type(), output)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args = Arguments::parse();

    run(&args.file, &mut io::stdout().lock())
}
