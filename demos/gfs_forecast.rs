use hydromet::{presets, ForecastConfig, Hydromet, HydrometError};

#[tokio::main]
async fn main() -> Result<(), HydrometError> {
    env_logger::init();

    let client = Hydromet::new();
    let config = ForecastConfig::new(presets::drina_basin_stations());

    let path = client.forecast_to_csv(&config).await?;
    println!("Wrote {}", path.display());
    Ok(())
}
