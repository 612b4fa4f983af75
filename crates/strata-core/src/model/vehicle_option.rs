use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::record::{Lineage, TemporalRecord};
use crate::value::{self, FieldValue, ValueMap};

/// Vehicle option
///
/// One option on one vehicle, e.g. a tow bar. The same upstream option id
/// appears on many vehicles, so the parent row id is part of the business
/// key: an option's identity is bound to one vehicle version, and a vehicle
/// that re-versions gets its options re-keyed under the new row id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleOption {
    pub external_id: String,
    pub external_reference: String,
    pub option_name: String,
    pub included: bool,
    /// Technical id of the parent vehicle's current row; set by the caller
    /// after the vehicle batch has been applied
    pub vehicle_id: Option<String>,
    #[serde(default)]
    pub lineage: Lineage,
}

impl TemporalRecord for VehicleOption {
    fn table_name() -> &'static str {
        "vehicle_option"
    }

    fn business_keys() -> &'static [&'static str] {
        &["external_id", "vehicle_id"]
    }

    fn columns() -> &'static [&'static str] {
        &[
            "external_id",
            "external_reference",
            "option_name",
            "included",
            "vehicle_id",
        ]
    }

    fn value(&self, column: &str) -> FieldValue {
        match column {
            "external_id" => self.external_id.as_str().into(),
            "external_reference" => self.external_reference.as_str().into(),
            "option_name" => self.option_name.as_str().into(),
            "included" => self.included.into(),
            "vehicle_id" => self.vehicle_id.clone().into(),
            _ => FieldValue::Null,
        }
    }

    fn from_values(values: &ValueMap) -> Result<Self> {
        Ok(Self {
            external_id: value::text(values, "external_id")?,
            external_reference: value::text(values, "external_reference")?,
            option_name: value::text(values, "option_name")?,
            included: value::boolean(values, "included")?,
            vehicle_id: value::text_opt(values, "vehicle_id")?,
            lineage: Lineage::default(),
        })
    }

    fn lineage(&self) -> &Lineage {
        &self.lineage
    }

    fn lineage_mut(&mut self) -> &mut Lineage {
        &mut self.lineage
    }
}
