use std::error::Error;

use airportdb::db::{ourairports::airports::AIRPORTS_URL, prod_db::ProdDb};
use log::info;

/// Refresh the local airports table from the OurAirports dataset.
/// Run this job whenever a fresh snapshot is needed; the upstream file
/// is regenerated nightly.
fn main() -> Result<(), Box<dyn Error>> {
    env_logger::builder()
        .filter_level(log::LevelFilter::Info)
        .init();

    let archive = ProdDb::ourairports();
    let path = archive.download_file(AIRPORTS_URL)?;
    let airports = archive.read_file(&path)?;
    let n = archive.update_duckdb(&airports)?;
    info!("airports table refreshed with {} rows", n);

    Ok(())
}
