use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::record::{Lineage, TemporalRecord};
use crate::value::{self, FieldValue, ValueMap};

/// Vehicle
///
/// One concrete configuration on offer, identified upstream by its external
/// id. `vehicle_cluster_id` points at the parent cluster's current row and is
/// scd1: the parent's technical id changes whenever the parent gets a new
/// version, and that churn must not version the vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub external_id: String,
    pub make: String,
    pub model: String,
    pub variant: String,
    pub model_year: i64,
    pub range_in_km: i64,
    pub external_fuel_type_id: i64,
    pub image_uri: Option<String>,
    pub is_electric: Option<bool>,
    pub license_plate: Option<String>,
    pub color: Option<String>,
    pub fiscal_value_in_euro: Option<f64>,
    pub base_price_in_euro_per_month: Option<f64>,
    pub calculated_price_in_euro_per_month: Option<f64>,
    /// Technical id of the parent cluster's current row; set by the caller
    /// after the cluster batch has been applied
    pub vehicle_cluster_id: Option<String>,
    #[serde(default)]
    pub lineage: Lineage,
}

impl TemporalRecord for Vehicle {
    fn table_name() -> &'static str {
        "vehicle"
    }

    fn business_keys() -> &'static [&'static str] {
        &["external_id"]
    }

    fn scd1_attribute_keys() -> &'static [&'static str] {
        &["vehicle_cluster_id"]
    }

    fn columns() -> &'static [&'static str] {
        &[
            "external_id",
            "make",
            "model",
            "variant",
            "model_year",
            "range_in_km",
            "external_fuel_type_id",
            "image_uri",
            "is_electric",
            "license_plate",
            "color",
            "fiscal_value_in_euro",
            "base_price_in_euro_per_month",
            "calculated_price_in_euro_per_month",
            "vehicle_cluster_id",
        ]
    }

    fn value(&self, column: &str) -> FieldValue {
        match column {
            "external_id" => self.external_id.as_str().into(),
            "make" => self.make.as_str().into(),
            "model" => self.model.as_str().into(),
            "variant" => self.variant.as_str().into(),
            "model_year" => self.model_year.into(),
            "range_in_km" => self.range_in_km.into(),
            "external_fuel_type_id" => self.external_fuel_type_id.into(),
            "image_uri" => self.image_uri.clone().into(),
            "is_electric" => self.is_electric.into(),
            "license_plate" => self.license_plate.clone().into(),
            "color" => self.color.clone().into(),
            "fiscal_value_in_euro" => self.fiscal_value_in_euro.into(),
            "base_price_in_euro_per_month" => self.base_price_in_euro_per_month.into(),
            "calculated_price_in_euro_per_month" => {
                self.calculated_price_in_euro_per_month.into()
            }
            "vehicle_cluster_id" => self.vehicle_cluster_id.clone().into(),
            _ => FieldValue::Null,
        }
    }

    fn from_values(values: &ValueMap) -> Result<Self> {
        Ok(Self {
            external_id: value::text(values, "external_id")?,
            make: value::text(values, "make")?,
            model: value::text(values, "model")?,
            variant: value::text(values, "variant")?,
            model_year: value::integer(values, "model_year")?,
            range_in_km: value::integer(values, "range_in_km")?,
            external_fuel_type_id: value::integer(values, "external_fuel_type_id")?,
            image_uri: value::text_opt(values, "image_uri")?,
            is_electric: value::boolean_opt(values, "is_electric")?,
            license_plate: value::text_opt(values, "license_plate")?,
            color: value::text_opt(values, "color")?,
            fiscal_value_in_euro: value::real_opt(values, "fiscal_value_in_euro")?,
            base_price_in_euro_per_month: value::real_opt(
                values,
                "base_price_in_euro_per_month",
            )?,
            calculated_price_in_euro_per_month: value::real_opt(
                values,
                "calculated_price_in_euro_per_month",
            )?,
            vehicle_cluster_id: value::text_opt(values, "vehicle_cluster_id")?,
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
