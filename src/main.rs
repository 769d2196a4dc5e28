#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = gradeledger::run().await {
        eprintln!("gradeledger fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
