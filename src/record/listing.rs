use crate::record::SpecNumber;
use serde::{Deserialize, Serialize};

/// CSV column contract, in order
pub const COLUMNS: [&str; 8] = [
    "Name",
    "Price",
    "RAM",
    "Storage",
    "Camera",
    "ScreenSize",
    "Battery",
    "ReleaseYear",
];

/// One smartphone observation
///
/// `name` is the dedup key and is never empty for a persisted record.
/// Every other field is best-effort and serializes as an empty CSV cell
/// when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    #[serde(rename = "Name")]
    pub name: String,

    /// Price in whole currency units
    #[serde(rename = "Price")]
    pub price: Option<u64>,

    /// RAM in GB
    #[serde(rename = "RAM")]
    pub ram: Option<SpecNumber>,

    /// Storage in GB
    #[serde(rename = "Storage")]
    pub storage: Option<SpecNumber>,

    /// Main camera resolution in MP
    #[serde(rename = "Camera")]
    pub camera: Option<u32>,

    /// Screen diagonal in inches
    #[serde(rename = "ScreenSize")]
    pub screen_size: Option<f64>,

    /// Battery capacity in mAh
    #[serde(rename = "Battery")]
    pub battery: Option<u32>,

    #[serde(rename = "ReleaseYear")]
    pub release_year: Option<u16>,
}

impl ListingRecord {
    /// Creates a record with only a name; every spec field starts absent
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            price: None,
            ram: None,
            storage: None,
            camera: None,
            screen_size: None,
            battery: None,
            release_year: None,
        }
    }

    pub fn has_price(&self) -> bool {
        self.price.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_record_is_empty() {
        let record = ListingRecord::named("Galaxy A15");
        assert_eq!(record.name, "Galaxy A15");
        assert!(!record.has_price());
        assert!(record.ram.is_none());
        assert!(record.release_year.is_none());
    }

    #[test]
    fn test_csv_row_leaves_absent_fields_empty() {
        let mut record = ListingRecord::named("Redmi Note 13");
        record.price = Some(2_499_000);
        record.ram = Some(SpecNumber::Int(8));
        record.screen_size = Some(6.67);

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        writer.serialize(&record).unwrap();
        let row = String::from_utf8(writer.into_inner().unwrap()).unwrap();

        assert_eq!(row, "Redmi Note 13,2499000,8,,,6.67,,\n");
    }
}
