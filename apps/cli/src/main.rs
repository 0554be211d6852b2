use clap::Parser;
use warehouse_cli::{init_tracing, run, Cli};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(cli, &mut out).await?;

    Ok(())
}
