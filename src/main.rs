use anyhow::Result;
use clap::Parser;

use sv_scatter::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.run()
}
