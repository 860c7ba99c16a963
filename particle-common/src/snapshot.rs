use serde::{Serialize, Deserialize};

/// A snapshot of the population at a specific step, as read by a renderer or tabulator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// The step number at which the snapshot was taken (0 = initial placement).
    pub step: u64,
    pub particle_count: u32,
    /// Contact pairs found during the step that produced this state.
    pub contact_pairs: u32,
    /// Energy statistics; absent when the run carries no energy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_energy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_energy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_energy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_energy: Option<f64>,
    /// Raw [x, y] positions, only if `output.save_positions_in_snapshot` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub positions: Option<Vec<(f64, f64)>>,
    /// Per-particle energies, only if `output.save_energies_in_snapshot` is set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energies: Option<Vec<f64>>,
}
