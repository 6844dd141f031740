// Airport reference data from the OurAirports project.
// https://davidmegginson.github.io/ourairports-data/airports.csv

use duckdb::{params, Connection};
use jiff::civil::Date;
use jiff::Zoned;
use log::info;
use reqwest::StatusCode;
use serde::Deserialize;
use std::error::Error;
use std::fs::{self, File};
use std::path::Path;

pub const AIRPORTS_URL: &str =
    "https://davidmegginson.github.io/ourairports-data/airports.csv";

/// Columns kept from the source file, in table order.  The source carries
/// more columns (elevation_ft, continent, gps_code, ...); everything not
/// listed here is dropped.
const SOURCE_COLUMNS: [&str; 10] = [
    "id",
    "ident",
    "name",
    "latitude_deg",
    "longitude_deg",
    "iso_country",
    "iso_region",
    "municipality",
    "icao_code",
    "iata_code",
];

#[derive(Clone)]
pub struct OurAirportsArchive {
    pub base_dir: String,
    pub duckdb_path: String,
}

/// One airport with an assigned ICAO code.  Rows without one are filtered
/// out when the raw file is read.
#[derive(Debug, Clone, PartialEq)]
pub struct Airport {
    pub id: i64,
    pub ident: String,
    pub name: String,
    pub latitude_deg: Option<f64>,
    pub longitude_deg: Option<f64>,
    pub iso_country: Option<String>,
    pub iso_region: Option<String>,
    pub municipality: Option<String>,
    pub icao_code: String,
    pub iata_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawRow {
    id: i64,
    ident: String,
    name: String,
    latitude_deg: Option<f64>,
    longitude_deg: Option<f64>,
    iso_country: Option<String>,
    iso_region: Option<String>,
    municipality: Option<String>,
    icao_code: Option<String>,
    iata_code: Option<String>,
}

fn check_header(headers: &csv::StringRecord) -> Result<(), Box<dyn Error>> {
    let missing: Vec<&str> = SOURCE_COLUMNS
        .iter()
        .filter(|name| !headers.iter().any(|h| h == **name))
        .copied()
        .collect();
    if !missing.is_empty() {
        return Err(Box::from(format!(
            "source file is missing expected column(s): {}",
            missing.join(", ")
        )));
    }
    Ok(())
}

impl OurAirportsArchive {
    /// Return the csv filename for the snapshot downloaded on `date`.
    pub fn filename(&self, date: &Date) -> String {
        self.base_dir.to_owned() + "/Raw/airports_" + &date.to_string() + ".csv"
    }

    /// Download the full dataset and keep a dated raw copy on disk.
    /// The dataset is regenerated upstream every night.
    pub fn download_file(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let path = self.filename(&Zoned::now().date());
        let dir = Path::new(&path).parent().unwrap();
        fs::create_dir_all(dir)?;

        let response = reqwest::blocking::get(url)?;
        if response.status() != StatusCode::OK {
            return Err(Box::from(format!(
                "download of {} failed with status {}",
                url,
                response.status()
            )));
        }
        let body = response.text()?;
        fs::write(&path, &body)?;
        info!("downloaded {} to {}", url, path);

        Ok(path)
    }

    /// Read a raw csv file and keep only the airports with an ICAO code,
    /// projected onto the columns in [SOURCE_COLUMNS].  Row order is
    /// preserved.  Errors out with the missing column names if the source
    /// schema has changed.
    pub fn read_file(&self, path: &str) -> Result<Vec<Airport>, Box<dyn Error>> {
        let file = File::open(path)?;
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(file);
        check_header(rdr.headers()?)?;

        let mut airports: Vec<Airport> = Vec::new();
        for result in rdr.deserialize() {
            let row: RawRow = result?;
            let icao_code = match row.icao_code {
                Some(code) if !code.is_empty() => code,
                _ => continue,
            };
            airports.push(Airport {
                id: row.id,
                ident: row.ident,
                name: row.name,
                latitude_deg: row.latitude_deg,
                longitude_deg: row.longitude_deg,
                iso_country: row.iso_country,
                iso_region: row.iso_region,
                municipality: row.municipality,
                icao_code,
                iata_code: row.iata_code,
            });
        }

        Ok(airports)
    }

    /// Replace the `airports` table with the given rows.  The whole replace
    /// runs in one transaction, so a failed run leaves the previous table in
    /// place.  Other tables in the same file are not touched.
    pub fn update_duckdb(&self, airports: &[Airport]) -> Result<usize, Box<dyn Error>> {
        if let Some(dir) = Path::new(&self.duckdb_path).parent() {
            fs::create_dir_all(dir)?;
        }
        let conn = Connection::open(&self.duckdb_path)?;
        conn.execute_batch(
            r"
BEGIN;
CREATE OR REPLACE TABLE airports (
    id BIGINT,
    ident VARCHAR,
    name VARCHAR,
    latitude_deg DOUBLE,
    longitude_deg DOUBLE,
    iso_country VARCHAR,
    iso_region VARCHAR,
    municipality VARCHAR,
    icao_code VARCHAR NOT NULL,
    iata_code VARCHAR
);",
        )?;
        {
            let mut stmt = conn.prepare(
                "INSERT INTO airports VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            )?;
            for airport in airports {
                stmt.execute(params![
                    airport.id,
                    airport.ident,
                    airport.name,
                    airport.latitude_deg,
                    airport.longitude_deg,
                    airport.iso_country,
                    airport.iso_region,
                    airport.municipality,
                    airport.icao_code,
                    airport.iata_code,
                ])?;
            }
        }
        conn.execute_batch("COMMIT;")?;
        conn.close().map_err(|(_, e)| e)?;
        info!(
            "wrote {} rows into the airports table of {}",
            airports.len(),
            self.duckdb_path
        );

        Ok(airports.len())
    }

    /// Look up airports by ICAO code.  The source enforces no uniqueness on
    /// icao_code, so more than one row can come back.
    pub fn get_airport(
        &self,
        conn: &Connection,
        icao: &str,
    ) -> Result<Vec<Airport>, Box<dyn Error>> {
        let mut stmt = conn.prepare(
            r"
SELECT id, ident, name, latitude_deg, longitude_deg,
    iso_country, iso_region, municipality, icao_code, iata_code
FROM airports
WHERE icao_code = ?;",
        )?;
        let airports_iter = stmt.query_map(params![icao], |row| {
            Ok(Airport {
                id: row.get(0)?,
                ident: row.get(1)?,
                name: row.get(2)?,
                latitude_deg: row.get(3)?,
                longitude_deg: row.get(4)?,
                iso_country: row.get(5)?,
                iso_region: row.get(6)?,
                municipality: row.get(7)?,
                icao_code: row.get(8)?,
                iata_code: row.get(9)?,
            })
        })?;
        let airports = airports_iter.collect::<Result<Vec<_>, _>>()?;

        Ok(airports)
    }
}
