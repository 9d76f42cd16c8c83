use hydromet::{presets, DischargeConfig, Hydromet, HydrometError};

#[tokio::main]
async fn main() -> Result<(), HydrometError> {
    env_logger::init();

    let client = Hydromet::new();
    let config = DischargeConfig::new(presets::drina_basin_rivers());

    for path in client.discharge_to_csv(&config).await? {
        println!("Wrote {}", path.display());
    }
    Ok(())
}
