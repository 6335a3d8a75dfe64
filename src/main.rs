#[tokio::main]
async fn main() {
    if let Err(e) = nailedit_lib::run().await {
        eprintln!("nailedit: {e}");
        std::process::exit(1);
    }
}
