#[tokio::main]
async fn main() {
    turnover_engine::run().await;
}
