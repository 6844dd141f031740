use crate::db::ourairports::airports::OurAirportsArchive;

pub struct ProdDb {}

impl ProdDb {
    pub fn ourairports() -> OurAirportsArchive {
        OurAirportsArchive {
            base_dir: "includes/OurAirports".to_string(),
            duckdb_path: "includes/airports.duckdb".to_string(),
        }
    }
}
