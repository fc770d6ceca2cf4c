// src/bin/cli.rs
use bios_fetch::cli;

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    cli::run()
}
