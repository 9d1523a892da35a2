#[tokio::main]
async fn main() {
    if let Err(err) = trade_loader::run().await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
