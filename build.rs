// build.rs

//! Renders the man page from the same clap definitions the binary parses with.

#[allow(dead_code)]
#[path = "src/config.rs"]
mod config;

#[allow(dead_code)]
#[path = "src/cli.rs"]
mod cli;

use clap::CommandFactory;
use clap_mangen::Man;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// One page for the binary plus one per subcommand (`uberadb-install.1`, ...)
fn render_man_pages(dir: &Path) -> io::Result<()> {
    fs::create_dir_all(dir)?;

    let command = cli::Cli::command();
    let mut pages = vec![(String::from("uberadb"), command.clone())];
    for sub in command.get_subcommands() {
        pages.push((format!("uberadb-{}", sub.get_name()), sub.clone()));
    }

    for (name, page) in pages {
        let mut buffer = Vec::new();
        Man::new(page).render(&mut buffer)?;
        fs::write(dir.join(format!("{}.1", name)), buffer)?;
    }
    Ok(())
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=src/cli.rs");
    println!("cargo:rerun-if-changed=src/config.rs");

    let Some(manifest_dir) = env::var_os("CARGO_MANIFEST_DIR").map(PathBuf::from) else {
        println!("cargo:warning=CARGO_MANIFEST_DIR not set, skipping man pages");
        return;
    };

    if let Err(e) = render_man_pages(&manifest_dir.join("man")) {
        println!("cargo:warning=Failed to generate man pages: {}", e);
    }
}
