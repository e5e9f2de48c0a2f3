use anyhow::Result;
use clap::Parser;
use pysift::cli::{self, Cli, OutputFormat};
use pysift::Analyzer;

fn main() -> Result<()> {
    env_logger::init();
    let args = Cli::parse();

    let analyzer = Analyzer::with_config(args.to_config());
    let analysis = analyzer.analyze_file(&args.file)?;

    match args.format {
        OutputFormat::Text => print!("{}", cli::render_text(&analysis)),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&cli::render_json(&analysis))?)
        }
    }
    Ok(())
}
