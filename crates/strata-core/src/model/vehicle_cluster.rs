use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::record::{Lineage, TemporalRecord};
use crate::value::{self, FieldValue, ValueMap};

/// Vehicle cluster
///
/// A cluster is a vehicle make and model; every listed vehicle belongs to
/// the cluster of its make and model. Aggregates derived from the vehicles
/// currently on offer (count, cheapest price, newest model year) are scd1:
/// versioning them would open a new cluster row whenever any single vehicle
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleCluster {
    pub first_vehicle_id: String,
    pub external_type_id: String,
    pub make: String,
    pub model: String,
    pub latest_model_year: i64,
    pub vehicle_count: i64,
    pub min_price_in_euro_per_month: f64,
    pub fiscal_value_in_euro: f64,
    pub addition_percentage: f64,
    pub external_fuel_type_id: i64,
    pub max_co2_emission: i64,
    pub image_uri: String,
    #[serde(default)]
    pub lineage: Lineage,
}

impl TemporalRecord for VehicleCluster {
    fn table_name() -> &'static str {
        "vehicle_cluster"
    }

    fn business_keys() -> &'static [&'static str] {
        &["make", "model"]
    }

    fn scd1_attribute_keys() -> &'static [&'static str] {
        &[
            "first_vehicle_id",
            "latest_model_year",
            "vehicle_count",
            "min_price_in_euro_per_month",
            "fiscal_value_in_euro",
            "addition_percentage",
            "max_co2_emission",
            "image_uri",
        ]
    }

    fn columns() -> &'static [&'static str] {
        &[
            "first_vehicle_id",
            "external_type_id",
            "make",
            "model",
            "latest_model_year",
            "vehicle_count",
            "min_price_in_euro_per_month",
            "fiscal_value_in_euro",
            "addition_percentage",
            "external_fuel_type_id",
            "max_co2_emission",
            "image_uri",
        ]
    }

    fn value(&self, column: &str) -> FieldValue {
        match column {
            "first_vehicle_id" => self.first_vehicle_id.as_str().into(),
            "external_type_id" => self.external_type_id.as_str().into(),
            "make" => self.make.as_str().into(),
            "model" => self.model.as_str().into(),
            "latest_model_year" => self.latest_model_year.into(),
            "vehicle_count" => self.vehicle_count.into(),
            "min_price_in_euro_per_month" => self.min_price_in_euro_per_month.into(),
            "fiscal_value_in_euro" => self.fiscal_value_in_euro.into(),
            "addition_percentage" => self.addition_percentage.into(),
            "external_fuel_type_id" => self.external_fuel_type_id.into(),
            "max_co2_emission" => self.max_co2_emission.into(),
            "image_uri" => self.image_uri.as_str().into(),
            _ => FieldValue::Null,
        }
    }

    fn from_values(values: &ValueMap) -> Result<Self> {
        Ok(Self {
            first_vehicle_id: value::text(values, "first_vehicle_id")?,
            external_type_id: value::text(values, "external_type_id")?,
            make: value::text(values, "make")?,
            model: value::text(values, "model")?,
            latest_model_year: value::integer(values, "latest_model_year")?,
            vehicle_count: value::integer(values, "vehicle_count")?,
            min_price_in_euro_per_month: value::real(values, "min_price_in_euro_per_month")?,
            fiscal_value_in_euro: value::real(values, "fiscal_value_in_euro")?,
            addition_percentage: value::real(values, "addition_percentage")?,
            external_fuel_type_id: value::integer(values, "external_fuel_type_id")?,
            max_co2_emission: value::integer(values, "max_co2_emission")?,
            image_uri: value::text(values, "image_uri")?,
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
