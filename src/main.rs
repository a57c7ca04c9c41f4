use anyhow::Result;
use caption_pipeline::cli::Cli;
use clap::Parser;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("caption_pipeline=info".parse()?),
        )
        .init();

    Cli::parse().run()
}
