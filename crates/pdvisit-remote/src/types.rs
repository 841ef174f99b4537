//! Wire shapes for the visit table.

use pdvisit_core::VisitRecord;
use serde::{Deserialize, Serialize};

/// One row of the visit table, with the remote's column names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitRow {
    #[serde(rename = "agente_id")]
    pub route: String,
    #[serde(rename = "pdv_id")]
    pub identifier: String,
    #[serde(rename = "nombre_pdv")]
    pub resolved_name: Option<String>,
    #[serde(rename = "lat")]
    pub latitude: f64,
    #[serde(rename = "lng")]
    pub longitude: f64,
    pub accuracy: f64,
    #[serde(rename = "tiene_chips")]
    pub has_inventory: bool,
    #[serde(rename = "cantidad_chips")]
    pub inventory_count: Option<u32>,
    #[serde(rename = "se_entregaron")]
    pub left_inventory: bool,
    #[serde(rename = "cantidad_entregada")]
    pub left_inventory_count: Option<u32>,
}

impl From<&VisitRecord> for VisitRow {
    fn from(record: &VisitRecord) -> Self {
        Self {
            route: record.route.to_string(),
            identifier: record.identifier.to_string(),
            resolved_name: record.resolved_name.clone(),
            latitude: record.latitude,
            longitude: record.longitude,
            accuracy: record.accuracy,
            has_inventory: record.has_inventory,
            inventory_count: record.inventory_count,
            left_inventory: record.left_inventory,
            left_inventory_count: record.left_inventory_count,
        }
    }
}
