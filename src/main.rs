#[tokio::main]
async fn main() -> anyhow::Result<()> {
    service_broker::run_server().await
}
