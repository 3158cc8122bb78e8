//! Sector roll-up from the supplementary CSV
//!
//! The CSV carries `Ticker`, `date`, `close` and `sector` columns; anything
//! else in the file is ignored.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use crate::error::DashboardResult;
use crate::models::{parse_date, SectorRecord, SectorReturn};
use crate::returns::yearly_return;

#[derive(Debug, Deserialize)]
struct RawSectorRow {
    #[serde(rename = "Ticker")]
    ticker: String,
    date: String,
    close: Option<f64>,
    sector: String,
}

/// Load sector records from a CSV file on disk.
pub fn load_sector_csv<P: AsRef<Path>>(path: P) -> DashboardResult<Vec<SectorRecord>> {
    let file = File::open(path.as_ref())?;
    read_sector_csv(file)
}

/// Parse sector records from any reader.
pub fn read_sector_csv<R: Read>(reader: R) -> DashboardResult<Vec<SectorRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut records = Vec::new();

    for row in csv_reader.deserialize::<RawSectorRow>() {
        let row = row?;
        records.push(SectorRecord {
            date: parse_date(&row.date)?,
            ticker: row.ticker,
            close: row.close,
            sector: row.sector,
        });
    }

    Ok(records)
}

/// Mean yearly return (percent) per sector, best sector first.
///
/// Each ticker contributes once: its first and last non-blank close by date,
/// and the sector on its earliest row.
pub fn sector_performance(records: &[SectorRecord]) -> Vec<SectorReturn> {
    let mut by_ticker: BTreeMap<&str, Vec<&SectorRecord>> = BTreeMap::new();
    for record in records {
        by_ticker.entry(record.ticker.as_str()).or_default().push(record);
    }

    let mut by_sector: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    for (_, mut rows) in by_ticker {
        rows.sort_by_key(|r| r.date);
        let Some(sector) = rows.first().map(|r| r.sector.clone()) else {
            continue;
        };
        let mut closes = rows.iter().filter_map(|r| r.close);
        let Some(first_close) = closes.next() else {
            continue;
        };
        let last_close = closes.last().unwrap_or(first_close);
        if let Some(ret) = yearly_return(first_close, last_close) {
            by_sector.entry(sector).or_default().push(ret * 100.0);
        }
    }

    let mut sectors: Vec<SectorReturn> = by_sector
        .into_iter()
        .map(|(sector, returns)| SectorReturn {
            avg_yearly_return: returns.iter().sum::<f64>() / returns.len() as f64,
            sector,
        })
        .collect();

    sectors.sort_by(|a, b| {
        b.avg_yearly_return
            .total_cmp(&a.avg_yearly_return)
            .then_with(|| a.sector.cmp(&b.sector))
    });
    sectors
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = "\
Ticker,date,open,close,sector
TCS,2024-01-02,3500,3600,IT
TCS,2024-12-31 00:00:00,3900,3960,IT
INFY,2024-12-31,1800,1710,IT
INFY,2024-01-02,1500,1800,IT
SBIN,2024-01-02,600,600,BANKING
SBIN,2024-12-31,700,780,BANKING
ZERO,2024-01-02,0,0,ENERGY
ZERO,2024-12-31,10,10,ENERGY
";

    #[test]
    fn test_read_sector_csv() {
        let records = read_sector_csv(SAMPLE.as_bytes()).unwrap();
        assert_eq!(records.len(), 8);
        assert_eq!(records[1].ticker, "TCS");
        assert_eq!(records[1].date.to_string(), "2024-12-31");
        assert_eq!(records[1].close, Some(3960.0));
    }

    #[test]
    fn test_sector_performance_means_per_ticker_returns() {
        let records = read_sector_csv(SAMPLE.as_bytes()).unwrap();
        let sectors = sector_performance(&records);

        // BANKING: SBIN +30%. IT: TCS +10%, INFY -5% -> mean 2.5%. ENERGY dropped.
        assert_eq!(sectors.len(), 2);
        assert_eq!(sectors[0].sector, "BANKING");
        assert!((sectors[0].avg_yearly_return - 30.0).abs() < 1e-9);
        assert_eq!(sectors[1].sector, "IT");
        assert!((sectors[1].avg_yearly_return - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_blank_close_is_skipped() {
        let csv = "\
Ticker,date,close,sector
TCS,2024-01-02,,IT
TCS,2024-01-03,100,IT
TCS,2024-06-28,110,IT
TCS,2024-12-31,,IT
EMPTY,2024-01-02,,IT
";
        let records = read_sector_csv(csv.as_bytes()).unwrap();
        assert_eq!(records.len(), 5);
        assert_eq!(records[0].close, None);

        // TCS: 100 -> 110, blanks on either end ignored. EMPTY has no closes.
        let sectors = sector_performance(&records);
        assert_eq!(sectors.len(), 1);
        assert!((sectors[0].avg_yearly_return - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_load_sector_csv_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();

        let records = load_sector_csv(file.path()).unwrap();
        assert_eq!(records.len(), 8);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_sector_csv(dir.path().join("missing.csv")).is_err());
    }

    #[test]
    fn test_bad_date_is_an_error() {
        let csv = "Ticker,date,close,sector\nTCS,02/01/2024,10,IT\n";
        assert!(read_sector_csv(csv.as_bytes()).is_err());
    }
}
