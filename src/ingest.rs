use crate::error::{Result, SalescopeError};
use crate::schema::{RawRecord, SOURCE_COLUMNS};
use log::{debug, warn};
use std::io::Read;

/// Reads raw rows from a delimited source with the fixed dataset header.
///
/// A header missing one of the required columns fails the whole load;
/// structurally malformed lines (wrong field count, bad UTF-8) are skipped
/// with a warning rather than aborting it. Value-level problems (non-numeric
/// measures, unparseable dates) survive as text and are handled during
/// enrichment.
pub fn read_raw_records<R: Read>(reader: R) -> Result<Vec<RawRecord>> {
    let mut rdr = csv::Reader::from_reader(reader);

    let headers = rdr.headers()?.clone();
    for required in SOURCE_COLUMNS {
        if !headers.iter().any(|h| h == required) {
            return Err(SalescopeError::MissingColumn(required.to_string()));
        }
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for row in rdr.deserialize::<RawRecord>() {
        match row {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                warn!("Skipping malformed row: {}", e);
            }
        }
    }

    debug!(
        "Read {} raw records ({} malformed rows skipped)",
        records.len(),
        skipped
    );

    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) const HEADER: &str = "Invoice ID,Branch,City,Customer type,Gender,Product line,Unit price,Quantity,Tax 5%,Total,Date,Time,Payment,cogs,gross margin percentage,gross income,Rating";

    #[test]
    fn reads_well_formed_rows() {
        let csv_text = format!(
            "{}\n750-67-8428,A,Yangon,Member,Female,Health and beauty,74.69,7,26.1415,548.9715,1/5/2019,13:08:00,Ewallet,522.83,4.761904762,26.1415,9.1\n",
            HEADER
        );
        let records = read_raw_records(csv_text.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].invoice_id, "750-67-8428");
        assert_eq!(records[0].branch, "A");
        assert_eq!(records[0].total, "548.9715");
    }

    #[test]
    fn skips_structurally_broken_rows() {
        let csv_text = format!(
            "{}\nonly,three,fields\n123-45-6789,B,Mandalay,Normal,Male,Sports and travel,10.0,2,1.0,21.0,2/10/2019,18:30:00,Cash,20.0,4.76,1.0,7.0\n",
            HEADER
        );
        let records = read_raw_records(csv_text.as_bytes()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].city, "Mandalay");
    }

    #[test]
    fn empty_input_is_not_an_error() {
        let records = read_raw_records(format!("{}\n", HEADER).as_bytes()).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn missing_required_column_fails_the_load() {
        let result = read_raw_records("Invoice ID,Branch\nabc,A\n".as_bytes());
        assert!(matches!(
            result,
            Err(crate::error::SalescopeError::MissingColumn(_))
        ));
    }
}
