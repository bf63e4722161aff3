// Fixed-layout part record and its size constants.
use serde::Serialize;

use crate::core::text::BoundedText;

pub const PART_NAME_MAX: usize = 49;
pub const SIZE_METRIC_MAX: usize = 9;

pub type PartName = BoundedText<PART_NAME_MAX>;
pub type SizeMetric = BoundedText<SIZE_METRIC_MAX>;

/// One part entry.
///
/// Layout: 76 bytes, align 4. Fields stay in schema order under `repr(C)`,
/// which pads after each text field to realign the following `f32`.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PartRecord {
    pub part_number: i32,
    pub part_name: PartName,
    pub part_size: f32,
    pub size_metric: SizeMetric,
    pub part_cost: f32,
}

/// Bytes one record occupies in the store's backing storage.
pub const RECORD_SIZE: usize = size_of::<PartRecord>();

const _: () = assert!(size_of::<PartRecord>() == 76);
const _: () = assert!(align_of::<PartRecord>() == 4);

impl PartRecord {
    pub fn new(
        part_number: i32,
        part_name: &str,
        part_size: f32,
        size_metric: &str,
        part_cost: f32,
    ) -> Self {
        Self {
            part_number,
            part_name: PartName::new(part_name),
            part_size,
            size_metric: SizeMetric::new(size_metric),
            part_cost,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PartRecord, RECORD_SIZE};
    use serde_json::json;

    #[test]
    fn record_size_matches_layout() {
        assert_eq!(RECORD_SIZE, 76);
        assert_eq!(std::mem::offset_of!(PartRecord, part_name), 4);
        assert_eq!(std::mem::offset_of!(PartRecord, part_size), 56);
        assert_eq!(std::mem::offset_of!(PartRecord, size_metric), 60);
        assert_eq!(std::mem::offset_of!(PartRecord, part_cost), 72);
    }

    #[test]
    fn new_truncates_text_fields() {
        let record = PartRecord::new(
            7,
            "a part name that is deliberately much longer than forty-nine bytes",
            1.5,
            "centimetres",
            2.0,
        );
        assert_eq!(record.part_name.len(), 49);
        assert_eq!(record.size_metric, "centimetr");
    }

    #[test]
    fn serializes_text_fields_as_strings() {
        let record = PartRecord::new(111, "Bolt", 5.0, "mm", 0.25);
        let value = serde_json::to_value(record).expect("json");
        assert_eq!(
            value,
            json!({
                "part_number": 111,
                "part_name": "Bolt",
                "part_size": 5.0,
                "size_metric": "mm",
                "part_cost": 0.25,
            })
        );
    }
}
