//! SRDF replication payloads.

use serde::{Deserialize, Serialize};

/// An RDF group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RdfGroup {
    pub rdfg_number: i32,
    pub label: String,
    pub remote_rdfg_number: i32,
    pub remote_symmetrix: String,
    pub num_devices: i32,
    pub total_device_capacity: f64,
    pub local_ports: Vec<String>,
    pub remote_ports: Vec<String>,
    pub modes: Vec<String>,
    #[serde(rename = "type")]
    pub group_type: String,
    pub metro: bool,
    pub r#async: bool,
    pub witness: bool,
    pub witness_name: String,
    pub witness_protected_physical: bool,
    pub witness_protected_virtual: bool,
    pub witness_configured: bool,
    pub witness_effective: bool,
    pub bias_configured: bool,
    pub bias_effective: bool,
    pub witness_degraded: bool,
    pub local_online_ports: Vec<String>,
    pub remote_online_ports: Vec<String>,
    #[serde(rename = "device_polarity")]
    pub device_polarity: String,
}

/// Options for a suspend action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Suspend {
    pub force: bool,
    pub sym_force: bool,
    pub star: bool,
    pub hop2: bool,
    pub bypass: bool,
    pub immediate: bool,
    pub cons_exempt: bool,
    pub metro_bias: bool,
}

/// Options for a resume action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Resume {
    pub force: bool,
    pub sym_force: bool,
    pub star: bool,
    pub hop2: bool,
    pub bypass: bool,
    pub remote: bool,
    pub recover_point: bool,
}

/// Update of a storage group's RDF state.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ModifySgRdfGroup {
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspend: Option<Suspend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<Resume>,
    pub execution_option: String,
}

/// Creates SRDF protection for a storage group (`storageGroupSrdfCreate`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateSgSrdf {
    pub remote_symm_id: String,
    pub replication_mode: String,
    pub rdfg_number: i32,
    pub force_new_rdf_group: String,
    pub establish: bool,
    pub metro_bias: bool,
    pub remote_storage_group_name: String,
    pub thin_pool: String,
    pub fast_policy: String,
    #[serde(rename = "remoteSLO")]
    pub remote_slo: String,
    pub no_compression: bool,
    pub execution_option: String,
}

/// SRDF state of a storage group (`storageGroupRDFg`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SgRdfInfo {
    pub symmetrix_id: String,
    pub storage_group_name: String,
    pub rdf_group_number: i32,
    pub volume_rdf_types: Vec<String>,
    pub states: Vec<String>,
    pub modes: Vec<String>,
    pub hop2_rdfgs: Vec<i32>,
    pub hop2_states: Vec<String>,
    pub hop2_modes: Vec<String>,
    pub larger_rdf_sides: Vec<String>,
    pub total_tracks: i64,
    pub local_r1_invalid_tracks_hop1: i64,
    pub local_r2_invalid_tracks_hop1: i64,
    pub remote_r1_invalid_tracks_hop1: i64,
    pub remote_r2_invalid_tracks_hop1: i64,
    pub src_r1_invalid_tracks_hop2: i64,
    pub src_r2_invalid_tracks_hop2: i64,
    pub tgt_r1_invalid_tracks_hop2: i64,
    pub tgt_r2_invalid_tracks_hop2: i64,
}

/// RDF group numbers protecting a storage group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SgRdfgList {
    #[serde(rename = "rdfgs")]
    pub rdfg_list: Vec<String>,
}

/// A protected storage group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RdfStorageGroup {
    pub name: String,
    pub symmetrix_id: String,
    pub parent_name: String,
    pub child_names: Vec<String>,
    pub num_devices_non_gk: i32,
    #[serde(rename = "capacityGB")]
    pub capacity_gb: f64,
    #[serde(rename = "numSnapVXSnapshots")]
    pub num_snap_vx_snapshots: i32,
    #[serde(rename = "snapVXSnapshots")]
    pub snap_vx_snapshots: Vec<String>,
    pub rdf: bool,
    pub is_link_target: bool,
}

/// Automatic selection of local devices for new pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalDeviceAutoCriteria {
    pub pair_count: i32,
    pub emulation: String,
    pub capacity: i64,
    pub capacity_unit: String,
    pub local_thin_pool_name: String,
    pub remote_thin_pool_name: String,
}

/// Explicit list of local devices for new pairs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LocalDeviceListCriteria {
    pub local_device_list: Vec<String>,
    pub remote_thin_pool_name: String,
}

/// Creates replica pairs for a storage group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreateRdfPair {
    pub rdf_mode: String,
    pub rdf_type: String,
    pub invalidate_r1: bool,
    pub invalidate_r2: bool,
    pub establish: bool,
    pub restore: bool,
    pub format: bool,
    pub exempt: bool,
    #[serde(rename = "noWD")]
    pub no_wd: bool,
    pub remote: bool,
    pub bias: bool,
    pub recover_point: bool,
    #[serde(rename = "localDeviceAutoCriteriaParam")]
    pub local_device_auto_criteria: Option<LocalDeviceAutoCriteria>,
    #[serde(rename = "localDeviceListCriteriaParam")]
    pub local_device_list_criteria: Option<LocalDeviceListCriteria>,
    pub execution_option: String,
}

/// One RDF volume pair.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RdfDevicePair {
    #[serde(rename = "localSymmetrixId")]
    pub local_symm_id: String,
    #[serde(rename = "remoteSymmetrixId")]
    pub remote_symm_id: String,
    pub local_rdf_group_number: i32,
    pub remote_rdf_group_number: i32,
    pub local_volume_name: String,
    pub remote_volume_name: String,
    pub local_volume_state: String,
    pub remote_volume_state: String,
    pub volume_config: String,
    pub rdf_mode: String,
    pub rdfpair_state: String,
    pub larger_rdf_side: String,
}

/// Pairs created by a [`CreateRdfPair`] request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RdfDevicePairList {
    #[serde(rename = "devicePair")]
    pub rdf_device_pair: Vec<RdfDevicePair>,
}

/// RDF information for a protected storage group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageGroupRdfg {
    pub symmetrix_id: String,
    pub storage_group_name: String,
    pub rdf_group_number: i32,
    pub volume_rdf_types: Vec<String>,
    pub states: Vec<String>,
    pub modes: Vec<String>,
}
