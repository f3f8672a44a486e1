//! Renders manual pages for `droplet` into `OUT_DIR`.
//!
//! One page covers the top-level command and one covers each subcommand,
//! named `droplet-<subcommand>.1` as man(1) expects for git-style tools.

use std::env;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::{Command, CommandFactory};
use clap_mangen::Man;

#[path = "src/cli/mod.rs"]
mod cli;

fn render_page(command: Command, title: &str, out_dir: &Path) -> io::Result<()> {
    let mut page = Vec::new();
    Man::new(command).title(title.to_uppercase()).render(&mut page)?;
    fs::write(out_dir.join(format!("{title}.1")), page)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut cargo = io::stdout().lock();
    for watched in ["build.rs", "src/cli/mod.rs"] {
        writeln!(cargo, "cargo:rerun-if-changed={watched}")?;
    }

    let out_dir = env::var_os("OUT_DIR")
        .map(PathBuf::from)
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "OUT_DIR was not set"))?;

    let root = cli::Cli::command();
    let root_name = root.get_name().to_owned();
    for sub in root.get_subcommands() {
        let title = format!("{root_name}-{}", sub.get_name());
        render_page(sub.clone(), &title, &out_dir)?;
    }
    render_page(root, &root_name, &out_dir)?;

    Ok(())
}
