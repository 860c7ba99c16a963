use serde::{Deserialize, Serialize};
use anyhow::{Context, Result};
use crate::sim_params::SimParams;
use std::path::Path;

/// Shape of the bounded region the particles move within.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DomainShape {
    Rectangle,
    Circle,
}

impl std::str::FromStr for DomainShape {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "rectangle" | "square" | "box" => Ok(DomainShape::Rectangle),
            "circle" | "disk" => Ok(DomainShape::Circle),
            other => anyhow::bail!("unknown domain shape '{}', expected 'rectangle' or 'circle'", other),
        }
    }
}

/// How the sign of an energy transfer is drawn on contact.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DirectionModel {
    /// Sign of a standard-normal sample: -1, +1, or (vanishingly rarely) 0.
    NormalSign,
    /// Fair coin over {-1, +1}.
    CoinFlip,
}

// Configuration for the domain. `size` is the box side length, or the circle diameter.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct DomainConfig {
    pub shape: DomainShape,
    pub size: f64,
}

// Population properties, loaded from config.toml
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ParticleConfig {
    pub count: u32,
    /// Contact radius. 0 disables pairwise contacts.
    #[serde(default)]
    pub radius: f64,
    /// Initial velocity components are drawn from [-velocity_half_range, velocity_half_range].
    #[serde(default = "default_velocity_half_range")]
    pub velocity_half_range: f64,
}

// Energy exchange settings. The whole section is optional.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct ExchangeConfig {
    #[serde(default = "default_exchange_enabled")]
    pub enabled: bool,
    #[serde(default = "default_initial_energy")]
    pub initial_energy: f64,
    #[serde(default = "default_quantum")]
    pub quantum: f64,
    #[serde(default = "default_direction_model")]
    pub direction: DirectionModel,
}

// Configuration for timing
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct TimingConfig {
    pub total_steps: u64,
    #[serde(default = "default_record_interval_steps")]
    pub record_interval_steps: u64,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct InitialConditions {
    /// RNG seed; omitted means seeded from the OS.
    #[serde(default)]
    pub seed: Option<u64>,
}

// Configuration for what each in-memory snapshot carries.
#[derive(Deserialize, Serialize, Debug, Clone, Default)]
pub struct OutputConfig {
    #[serde(default)]
    pub save_positions_in_snapshot: bool,
    #[serde(default)]
    pub save_energies_in_snapshot: bool,
}

fn default_velocity_half_range() -> f64 {
    1.0
}

fn default_exchange_enabled() -> bool {
    true
}

fn default_initial_energy() -> f64 {
    0.5 // Midway between the two ends of the color ramp
}

fn default_quantum() -> f64 {
    0.1
}

fn default_direction_model() -> DirectionModel {
    DirectionModel::NormalSign
}

fn default_record_interval_steps() -> u64 {
    1
}

// Main simulation configuration structure, loaded from config.toml.
#[derive(Deserialize, Serialize, Debug, Clone)]
pub struct SimulationConfig {
    pub domain: DomainConfig,
    pub particles: ParticleConfig,
    #[serde(default)]
    pub exchange: Option<ExchangeConfig>,
    pub timing: TimingConfig,
    #[serde(default)]
    pub initial_conditions: InitialConditions,
    #[serde(default)]
    pub output: OutputConfig,
}

impl SimulationConfig {
    /// Loads the simulation configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();

        let config_str = std::fs::read_to_string(path_ref)
            .with_context(|| format!("Failed to read config file '{}'", path_ref.display()))?;
        Self::from_toml_str(&config_str)
            .with_context(|| format!("Invalid configuration in '{}'", path_ref.display()))
    }

    /// Parses and validates a configuration from TOML text.
    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        let config: SimulationConfig = toml::from_str(config_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// Boundary-only run: size 10 domain, point particles, velocities in [-1, 1].
    pub fn boundary_only(shape: DomainShape, count: u32) -> Self {
        SimulationConfig {
            domain: DomainConfig { shape, size: 10.0 },
            particles: ParticleConfig {
                count,
                radius: 0.0,
                velocity_half_range: 1.0,
            },
            exchange: None,
            timing: TimingConfig { total_steps: 500, record_interval_steps: 10 },
            initial_conditions: InitialConditions::default(),
            output: OutputConfig::default(),
        }
    }

    /// Energy-exchange run: size 10 box, radius 0.1, velocities in [-0.05, 0.05], energy 0.5.
    pub fn energy_exchange(count: u32) -> Self {
        SimulationConfig {
            domain: DomainConfig { shape: DomainShape::Rectangle, size: 10.0 },
            particles: ParticleConfig {
                count,
                radius: 0.1,
                velocity_half_range: 0.05,
            },
            exchange: Some(ExchangeConfig {
                enabled: true,
                initial_energy: default_initial_energy(),
                quantum: default_quantum(),
                direction: default_direction_model(),
            }),
            timing: TimingConfig { total_steps: 500, record_interval_steps: 10 },
            initial_conditions: InitialConditions::default(),
            output: OutputConfig::default(),
        }
    }

    /// Whether the energy exchange variant is active.
    pub fn exchange_enabled(&self) -> bool {
        self.exchange.as_ref().is_some_and(|e| e.enabled)
    }

    /// Rejects configurations the simulation cannot run with.
    pub fn validate(&self) -> Result<()> {
        let size = self.domain.size;
        if !size.is_finite() || size <= 0.0 {
            anyhow::bail!("domain.size must be positive and finite (got {}).", size);
        }
        let radius = self.particles.radius;
        if !radius.is_finite() || radius < 0.0 {
            anyhow::bail!("particles.radius must be non-negative and finite (got {}).", radius);
        }
        if self.domain.shape == DomainShape::Rectangle && 2.0 * radius > size {
            anyhow::bail!(
                "particles.radius {} does not fit a rectangle domain of size {}.",
                radius, size
            );
        }
        let half_range = self.particles.velocity_half_range;
        if !half_range.is_finite() || half_range < 0.0 {
            anyhow::bail!(
                "particles.velocity_half_range must be non-negative and finite (got {}).",
                half_range
            );
        }
        if let Some(exchange) = &self.exchange {
            if !(0.0..=1.0).contains(&exchange.initial_energy) {
                anyhow::bail!(
                    "exchange.initial_energy must lie in [0, 1] (got {}).",
                    exchange.initial_energy
                );
            }
            if !exchange.quantum.is_finite() || exchange.quantum < 0.0 {
                anyhow::bail!(
                    "exchange.quantum must be non-negative and finite (got {}).",
                    exchange.quantum
                );
            }
        }
        if self.timing.record_interval_steps == 0 {
            anyhow::bail!("timing.record_interval_steps must be greater than 0.");
        }
        Ok(())
    }

    /// Converts the configuration into simulation parameters used at runtime.
    pub fn get_sim_params(&self) -> SimParams {
        let exchange = self.exchange.as_ref().filter(|e| e.enabled);

        SimParams {
            domain_shape: self.domain.shape,
            domain_size: self.domain.size,
            particle_radius: self.particles.radius,
            velocity_half_range: self.particles.velocity_half_range,
            exchange_enabled: exchange.is_some(),
            initial_energy: exchange.map_or(0.0, |e| e.initial_energy),
            energy_quantum: exchange.map_or(0.0, |e| e.quantum),
            direction_model: exchange.map_or(DirectionModel::NormalSign, |e| e.direction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_TOML: &str = r#"
        [domain]
        shape = "rectangle"
        size = 10.0

        [particles]
        count = 300
        radius = 0.1
        velocity_half_range = 0.05

        [exchange]
        initial_energy = 0.5
        quantum = 0.1
        direction = "coin_flip"

        [timing]
        total_steps = 200
        record_interval_steps = 20

        [initial_conditions]
        seed = 42

        [output]
        save_positions_in_snapshot = true
    "#;

    #[test]
    fn parses_full_config() -> Result<()> {
        let config = SimulationConfig::from_toml_str(FULL_TOML)?;
        assert_eq!(config.domain.shape, DomainShape::Rectangle);
        assert_eq!(config.particles.count, 300);
        assert!(config.exchange_enabled());
        assert_eq!(config.exchange.as_ref().map(|e| e.direction), Some(DirectionModel::CoinFlip));
        assert_eq!(config.initial_conditions.seed, Some(42));
        assert!(config.output.save_positions_in_snapshot);
        assert!(!config.output.save_energies_in_snapshot);
        Ok(())
    }

    #[test]
    fn optional_sections_default() -> Result<()> {
        let config = SimulationConfig::from_toml_str(
            r#"
            [domain]
            shape = "circle"
            size = 10.0
            [particles]
            count = 10
            [timing]
            total_steps = 5
            "#,
        )?;
        assert!(!config.exchange_enabled());
        assert_eq!(config.particles.radius, 0.0);
        assert_eq!(config.particles.velocity_half_range, 1.0);
        assert_eq!(config.timing.record_interval_steps, 1);
        assert_eq!(config.initial_conditions.seed, None);

        let params = config.get_sim_params();
        assert_eq!(params.domain_shape, DomainShape::Circle);
        assert_eq!(params.domain_size, 10.0);
        assert!(!params.exchange_enabled);
        Ok(())
    }

    #[test]
    fn rejects_non_positive_size() {
        let mut config = SimulationConfig::boundary_only(DomainShape::Rectangle, 10);
        config.domain.size = 0.0;
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("domain.size"));
    }

    #[test]
    fn rejects_negative_radius() {
        let mut config = SimulationConfig::energy_exchange(10);
        config.particles.radius = -0.1;
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("radius"));
    }

    #[test]
    fn rejects_radius_wider_than_box() {
        let mut config = SimulationConfig::energy_exchange(10);
        config.domain.size = 0.15;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_out_of_range_energy() {
        let mut config = SimulationConfig::energy_exchange(10);
        if let Some(exchange) = config.exchange.as_mut() {
            exchange.initial_energy = 1.5;
        }
        let msg = config.validate().unwrap_err().to_string();
        assert!(msg.contains("initial_energy"));
    }

    #[test]
    fn presets_are_valid() {
        assert!(SimulationConfig::boundary_only(DomainShape::Circle, 1000).validate().is_ok());
        assert!(SimulationConfig::energy_exchange(300).validate().is_ok());
    }

    #[test]
    fn disabled_exchange_section_turns_off_energy() -> Result<()> {
        let mut config = SimulationConfig::energy_exchange(10);
        if let Some(exchange) = config.exchange.as_mut() {
            exchange.enabled = false;
        }
        assert!(!config.exchange_enabled());
        assert!(!config.get_sim_params().exchange_enabled);
        Ok(())
    }

    #[test]
    fn shape_from_str() -> Result<()> {
        assert_eq!("Circle".parse::<DomainShape>()?, DomainShape::Circle);
        assert_eq!("square".parse::<DomainShape>()?, DomainShape::Rectangle);
        assert!("hexagon".parse::<DomainShape>().is_err());
        Ok(())
    }
}
