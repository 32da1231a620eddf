use anyhow::Result;
use attendance::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    attendance::init_tracing();

    let settings = Settings::load()?;
    attendance::api::serve(&settings.database_url, &settings.bind_addr).await
}
