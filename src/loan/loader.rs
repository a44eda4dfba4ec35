//! Load loan offers from a CSV file
//!
//! Columns: `name,type,principal,rate,years,fees,rates,interest_only_years,balloon`.
//! Only `principal` and `years` are needed in every row; blank cells are
//! treated as absent.

use super::{LoanPayload, RateList};
use csv::Reader;
use std::error::Error;
use std::path::Path;

/// Raw CSV row; optional columns may be missing from the header entirely
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type", default)]
    loan_type: Option<String>,
    principal: f64,
    #[serde(default)]
    rate: Option<f64>,
    years: f64,
    #[serde(default)]
    fees: Option<f64>,
    #[serde(default)]
    rates: Option<String>,
    #[serde(default)]
    interest_only_years: Option<f64>,
    #[serde(default)]
    balloon: Option<f64>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

impl CsvRow {
    fn into_payload(self) -> LoanPayload {
        LoanPayload {
            loan_type: non_blank(self.loan_type),
            name: non_blank(self.name),
            principal: Some(self.principal),
            years: Some(self.years),
            fees: self.fees,
            start_date: None,
            rate: self.rate,
            rates: non_blank(self.rates).map(RateList::Text),
            interest_only_years: self.interest_only_years,
            balloon: self.balloon,
        }
    }
}

/// Load all offers from a CSV file
pub fn load_offers<P: AsRef<Path>>(path: P) -> Result<Vec<LoanPayload>, Box<dyn Error>> {
    let reader = Reader::from_path(path)?;
    read_offers(reader)
}

/// Load offers from any reader (e.g., string buffer, request body)
pub fn load_offers_from_reader<R: std::io::Read>(reader: R) -> Result<Vec<LoanPayload>, Box<dyn Error>> {
    read_offers(Reader::from_reader(reader))
}

fn read_offers<R: std::io::Read>(mut reader: Reader<R>) -> Result<Vec<LoanPayload>, Box<dyn Error>> {
    let mut offers = Vec::new();

    for result in reader.deserialize() {
        let row: CsvRow = result?;
        offers.push(row.into_payload());
    }

    Ok(offers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_offers_from_reader() {
        let data = "\
name,type,principal,rate,years,fees,rates,interest_only_years,balloon
Bank A,fixed,100000,5,30,0,,,
Bank B,,100000,4.5,30,2000,,,
Credit Union,variable,100000,,10,500,\"4,4.5,5\",,
Builder,balloon,100000,5,7,0,,,25
";
        let offers = load_offers_from_reader(data.as_bytes()).unwrap();
        assert_eq!(offers.len(), 4);

        assert_eq!(offers[0].name.as_deref(), Some("Bank A"));
        assert_eq!(offers[1].type_name(), "fixed");
        assert_eq!(offers[1].fees, Some(2000.0));
        assert_eq!(offers[2].rates, Some(RateList::Text("4,4.5,5".to_string())));
        assert_eq!(offers[2].rate, None);
        assert_eq!(offers[3].balloon, Some(25.0));
    }

    #[test]
    fn test_minimal_columns() {
        let data = "principal,rate,years\n250000,6.25,15\n";
        let offers = load_offers_from_reader(data.as_bytes()).unwrap();
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].name, None);
        assert_eq!(offers[0].rate, Some(6.25));
    }

    #[test]
    fn test_malformed_row_is_an_error() {
        let data = "principal,rate,years\nlots,6,15\n";
        assert!(load_offers_from_reader(data.as_bytes()).is_err());
    }
}
