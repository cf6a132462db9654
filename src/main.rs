#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = opencourse_rust::run().await {
        eprintln!("opencourse-rust fatal: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}
