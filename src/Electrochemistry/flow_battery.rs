//! # Flow battery electrolyte calculations
//!
//! Two closed-form estimates for a redox-active material:
//! - mass of active material needed to store a fixed amount of energy (1 kWh by default)
//!   `n = E / (z F U)`, `m = n M`
//! - energy density of a solution of the material with a given solubility
//!   `E_V = c z F U`, converted from J/L to kWh/L
//!
//! Both return the rounded value and a `CalcTrace` with every intermediate quantity.
//! ```
//! use MolCalc::Electrochemistry::flow_battery::active_material_mass;
//! let m = active_material_mass("VOSO4", 1.0, 1.2).unwrap();
//! assert_eq!(m.value, 5068.207);
//! ```
use super::calc_trace::CalcTrace;
use crate::MolarMass::molmass::{calculate_molar_mass, parse_formula, round_result};
use crate::calc_api::CalcError;
use crate::settings::CalcConfig;
use log::{info, warn};
use serde::Serialize;
use thiserror::Error;

/// Faraday constant, C/mol
pub const FARADAY_CONSTANT: f64 = 96485.0;
/// 1 kWh = 1000 W * 3600 s
pub const JOULES_PER_KWH: f64 = 3.6e6;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    #[error("{parameter} must be a positive number, got {value}")]
    NonPositive { parameter: String, value: f64 },
    #[error("{quantity} is out of range ({value}), check the inputs")]
    NonFinite { quantity: String, value: f64 },
}

/// Physically meaningful inputs are strictly positive and finite; NaN fails too.
fn require_positive(parameter: &str, value: f64) -> Result<f64, DomainError> {
    if value > 0.0 && value.is_finite() {
        Ok(value)
    } else {
        warn!("{} rejected: {}", parameter, value);
        Err(DomainError::NonPositive {
            parameter: parameter.to_string(),
            value,
        })
    }
}

// finite inputs can still overflow or underflow on the way to the result
fn require_finite(quantity: &str, value: f64) -> Result<f64, DomainError> {
    if value.is_finite() {
        Ok(value)
    } else {
        warn!("{} is not finite: {}", quantity, value);
        Err(DomainError::NonFinite {
            quantity: quantity.to_string(),
            value,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicalConstants {
    /// C/mol
    pub faraday_constant: f64,
    /// energy the active material has to store, kWh
    pub stored_energy_kwh: f64,
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self {
            faraday_constant: FARADAY_CONSTANT,
            stored_energy_kwh: 1.0,
        }
    }
}

impl From<&CalcConfig> for PhysicalConstants {
    fn from(config: &CalcConfig) -> Self {
        Self {
            faraday_constant: config.faraday_constant,
            stored_energy_kwh: config.stored_energy_kwh,
        }
    }
}

/// Result of a derivation: rounded value plus the steps that produced it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Derivation {
    pub value: f64,
    pub trace: CalcTrace,
}

#[derive(Debug, Clone, Default)]
pub struct ElectrochemCalculator {
    pub constants: PhysicalConstants,
}

impl ElectrochemCalculator {
    pub fn new() -> Self {
        Self {
            constants: PhysicalConstants::default(),
        }
    }

    pub fn with_constants(constants: PhysicalConstants) -> Self {
        Self { constants }
    }

    /// Mass of active material (g) needed to store `stored_energy_kwh` at the given cell
    /// voltage (V) and number of electrons transferred per formula unit.
    pub fn active_material_mass(
        &self,
        formula: &str,
        electron_transfer: f64,
        voltage: f64,
    ) -> Result<Derivation, CalcError> {
        let z = require_positive("electron transfer", electron_transfer)?;
        let u = require_positive("voltage", voltage)?;
        let molecular_weight = calculate_molar_mass(formula)?.value;

        let f = self.constants.faraday_constant;
        let energy = self.constants.stored_energy_kwh * JOULES_PER_KWH;
        let moles = require_finite("moles required", energy / (z * f * u))?;
        let mass = require_finite("active material mass", moles * molecular_weight)?;

        let mut trace = CalcTrace::new();
        trace.push("Faraday constant", f, "C/mol");
        trace.push("stored energy", energy, "J");
        trace.push("electron transfer", z, "");
        trace.push("voltage", u, "V");
        trace.push("moles required", moles, "mol");
        trace.push("molecular weight", molecular_weight, "g/mol");
        trace.push("active material mass", mass, "g");

        let value = require_finite("active material mass", round_result(mass))?;
        info!(
            "active material mass of {} (z = {}, U = {} V): {:.3} g",
            formula, z, u, value
        );
        Ok(Derivation { value, trace })
    }

    /// Energy density (kWh/L) of a solution with the given solubility (mol/L).
    /// The formula is only validated, molar mass plays no part here.
    pub fn solution_energy_density(
        &self,
        formula: &str,
        electron_transfer: f64,
        voltage: f64,
        solubility: f64,
    ) -> Result<Derivation, CalcError> {
        let z = require_positive("electron transfer", electron_transfer)?;
        let u = require_positive("voltage", voltage)?;
        let c = require_positive("solubility", solubility)?;
        parse_formula(formula)?;

        let f = self.constants.faraday_constant;
        let energy_per_liter = require_finite("energy per liter", c * z * f * u)?;
        let energy_density = energy_per_liter / JOULES_PER_KWH;

        let mut trace = CalcTrace::new();
        trace.push("solubility", c, "mol/L");
        trace.push("electron transfer", z, "");
        trace.push("voltage", u, "V");
        trace.push("Faraday constant", f, "C/mol");
        trace.push("energy per liter", energy_per_liter, "J/L");
        trace.push("energy density", energy_density, "kWh/L");

        let value = require_finite("energy density", round_result(energy_density))?;
        info!(
            "energy density of {} solution ({} mol/L): {:.3} kWh/L",
            formula, c, value
        );
        Ok(Derivation { value, trace })
    }
}

pub fn active_material_mass(
    formula: &str,
    electron_transfer: f64,
    voltage: f64,
) -> Result<Derivation, CalcError> {
    ElectrochemCalculator::new().active_material_mass(formula, electron_transfer, voltage)
}

pub fn solution_energy_density(
    formula: &str,
    electron_transfer: f64,
    voltage: f64,
    solubility: f64,
) -> Result<Derivation, CalcError> {
    ElectrochemCalculator::new().solution_energy_density(formula, electron_transfer, voltage, solubility)
}
