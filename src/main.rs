#[tokio::main]
async fn main() {
    if let Err(e) = aggregator::run().await {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}
