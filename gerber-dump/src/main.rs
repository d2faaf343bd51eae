use std::fs::read_to_string;
use std::path::PathBuf;

use clap::Parser;
use gerber::{drill, gerber as gerber_fmt, LayerKind};

#[derive(Parser)]
struct Cli {
    /// Name of the file to dump
    filename: PathBuf,

    /// Treat unrecognized commands as fatal instead of skipping them with a warning
    #[arg(long)]
    strict: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let src = read_to_string(&cli.filename)?;
    let kind = LayerKind::from_path(&cli.filename)?;

    if kind.is_drill() {
        let doc = drill::parser::parse(&src, cli.strict)?;
        println!("{doc:#?}");
    } else {
        let doc = gerber_fmt::parser::parse(&src, cli.strict)?;
        println!("{doc:#?}");
    }

    Ok(())
}
