#[tokio::main]
async fn main() -> anyhow::Result<()> {
    isolator_lib::run().await
}
