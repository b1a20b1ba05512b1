//! # Calculation API
//!
//! ## Purpose
//! Entry point for callers that hand over a batch of formulas, e.g. a web front end or the
//! `--batch` mode of the CLI. Each request always gets a molar mass; the active material
//! mass is added when both electron transfer and voltage are given, and the solution energy
//! density when solubility is given as well.
//!
//! ## Request format
//! ```json
//! {
//!   "formulas": [
//!     { "formula": "H2O" },
//!     { "formula": "VOSO4", "electron_transfer": 1, "voltage": 1.2, "solubility": 2.0 }
//!   ]
//! }
//! ```
//! A bare array of requests is accepted as well. The first failing request fails the whole
//! batch.
use crate::Electrochemistry::calc_trace::CalcTrace;
use crate::Electrochemistry::flow_battery::{DomainError, ElectrochemCalculator};
use crate::MolarMass::molmass::{ElementContribution, ElementCounts, FormulaError, calculate_molar_mass};
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// error of any calculation exposed by the crate
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CalcError {
    #[error("formula error: {0}")]
    Formula(#[from] FormulaError),
    #[error("invalid input: {0}")]
    Domain(#[from] DomainError),
    #[error("invalid request: {0}")]
    Request(String),
    #[error("configuration error: {0}")]
    Config(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormulaRequest {
    pub formula: String,
    #[serde(default)]
    pub electron_transfer: Option<f64>,
    #[serde(default)]
    pub voltage: Option<f64>,
    /// mol/L
    #[serde(default)]
    pub solubility: Option<f64>,
}

impl FormulaRequest {
    pub fn new(formula: &str) -> Self {
        Self {
            formula: formula.to_string(),
            electron_transfer: None,
            voltage: None,
            solubility: None,
        }
    }

    pub fn with_cell(mut self, electron_transfer: f64, voltage: f64) -> Self {
        self.electron_transfer = Some(electron_transfer);
        self.voltage = Some(voltage);
        self
    }

    pub fn with_solubility(mut self, solubility: f64) -> Self {
        self.solubility = Some(solubility);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormulaResult {
    pub formula: String,
    /// g/mol
    pub molecular_weight: f64,
    /// g per stored kWh
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_material_mass: Option<f64>,
    /// kWh/L
    #[serde(skip_serializing_if = "Option::is_none")]
    pub energy_density: Option<f64>,
    pub elements: ElementCounts,
    pub breakdown: Vec<ElementContribution>,
    /// trace rendered as text, one step per line
    pub calculation_details: String,
    pub trace: CalcTrace,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BatchRequest {
    Wrapped { formulas: Vec<FormulaRequest> },
    Bare(Vec<FormulaRequest>),
}

/// Runs every calculation the request has inputs for
pub fn calculate_with(
    calculator: &ElectrochemCalculator,
    request: &FormulaRequest,
) -> Result<FormulaResult, CalcError> {
    let formula = request.formula.as_str();
    let molecular_weight = calculate_molar_mass(formula)?;
    let mut trace = molecular_weight.trace;

    let mut active_material_mass = None;
    let mut energy_density = None;
    if let (Some(z), Some(u)) = (request.electron_transfer, request.voltage) {
        let mass = calculator.active_material_mass(formula, z, u)?;
        active_material_mass = Some(mass.value);
        trace.extend(mass.trace);

        if let Some(c) = request.solubility {
            let density = calculator.solution_energy_density(formula, z, u, c)?;
            energy_density = Some(density.value);
            trace.extend(density.trace);
        }
    }

    Ok(FormulaResult {
        formula: formula.to_string(),
        molecular_weight: molecular_weight.value,
        active_material_mass,
        energy_density,
        elements: molecular_weight.elements,
        breakdown: molecular_weight.breakdown,
        calculation_details: trace.render().join("\n"),
        trace,
    })
}

pub fn calculate(request: &FormulaRequest) -> Result<FormulaResult, CalcError> {
    calculate_with(&ElectrochemCalculator::new(), request)
}

pub fn calculate_batch_with(
    calculator: &ElectrochemCalculator,
    requests: &[FormulaRequest],
) -> Result<Vec<FormulaResult>, CalcError> {
    let results = requests
        .iter()
        .map(|request| calculate_with(calculator, request))
        .collect::<Result<Vec<_>, _>>()?;
    info!("batch of {} formulas calculated", results.len());
    Ok(results)
}

pub fn calculate_batch(requests: &[FormulaRequest]) -> Result<Vec<FormulaResult>, CalcError> {
    calculate_batch_with(&ElectrochemCalculator::new(), requests)
}

/// parses a JSON batch request
pub fn parse_batch_json(json: &str) -> Result<Vec<FormulaRequest>, CalcError> {
    let batch: BatchRequest =
        serde_json::from_str(json).map_err(|e| CalcError::Request(e.to_string()))?;
    Ok(match batch {
        BatchRequest::Wrapped { formulas } => formulas,
        BatchRequest::Bare(formulas) => formulas,
    })
}

/// JSON in, pretty JSON array of results out
pub fn calculate_batch_json(
    calculator: &ElectrochemCalculator,
    json: &str,
) -> Result<String, CalcError> {
    let requests = parse_batch_json(json)?;
    let results = calculate_batch_with(calculator, &requests)?;
    serde_json::to_string_pretty(&results).map_err(|e| CalcError::Request(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_molar_mass_only() {
        let result = calculate(&FormulaRequest::new("H2O")).unwrap();
        assert_eq!(result.molecular_weight, 18.015);
        assert_eq!(result.active_material_mass, None);
        assert_eq!(result.energy_density, None);
        assert_eq!(result.elements.get("H"), Some(2));
        assert!(result.calculation_details.ends_with("molecular weight: 18.015 g/mol"));
    }

    #[test]
    fn test_solubility_without_cell_is_ignored() {
        let request = FormulaRequest::new("VOSO4").with_solubility(2.0);
        let result = calculate(&request).unwrap();
        assert_eq!(result.active_material_mass, None);
        assert_eq!(result.energy_density, None);
    }

    #[test]
    fn test_full_request() {
        let request = FormulaRequest::new("VOSO4").with_cell(1.0, 1.2).with_solubility(2.0);
        let result = calculate(&request).unwrap();
        assert_eq!(result.molecular_weight, 163.002);
        assert_eq!(result.active_material_mass, Some(5068.207));
        assert_eq!(result.energy_density, Some(0.064));
        // 3 elements + molecular weight, 7 mass steps, 6 density steps
        assert_eq!(result.trace.len(), 4 + 7 + 6);
        assert_eq!(result.calculation_details.lines().count(), result.trace.len());
        assert!(result.calculation_details.contains("active material mass: 5068.207 g"));
        assert!(result.calculation_details.contains("energy per liter: 231564.000 J/L"));
    }

    #[test]
    fn test_mass_without_solubility() {
        let request = FormulaRequest::new("VOSO4").with_cell(1.0, 1.2);
        let result = calculate(&request).unwrap();
        assert_eq!(result.active_material_mass, Some(5068.207));
        assert_eq!(result.energy_density, None);
    }

    #[test]
    fn test_batch_stops_on_first_error() {
        let requests = vec![
            FormulaRequest::new("H2O"),
            FormulaRequest::new("Xx"),
            FormulaRequest::new("NaCl"),
        ];
        assert_eq!(
            calculate_batch(&requests),
            Err(CalcError::Formula(FormulaError::UnknownElement {
                symbol: "Xx".to_string()
            }))
        );
        let bad_voltage = vec![FormulaRequest::new("VOSO4").with_cell(1.0, 0.0)];
        assert!(matches!(calculate_batch(&bad_voltage), Err(CalcError::Domain(_))));
    }

    #[test]
    fn test_batch_json() {
        let json = r#"{"formulas": [
            {"formula": "Fe2(SO4)3", "electron_transfer": null, "voltage": null, "solubility": null},
            {"formula": "VOSO4", "electron_transfer": 1, "voltage": 1.2, "solubility": 2.0}
        ]}"#;
        let out = calculate_batch_json(&ElectrochemCalculator::new(), json).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        let results = value.as_array().unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["formula"], "Fe2(SO4)3");
        assert_eq!(results[0]["molecular_weight"], 399.873);
        assert!(results[0].get("active_material_mass").is_none());
        assert_eq!(results[0]["elements"]["O"], 12);
        assert_eq!(results[1]["active_material_mass"], 5068.207);
        assert_eq!(results[1]["energy_density"], 0.064);
        assert_eq!(results[1]["breakdown"][0]["symbol"], "V");
    }

    #[test]
    fn test_batch_json_never_writes_infinity_as_null() {
        let json = r#"[{"formula": "VOSO4", "electron_transfer": 1, "voltage": 1e-320}]"#;
        assert!(matches!(
            calculate_batch_json(&ElectrochemCalculator::new(), json),
            Err(CalcError::Domain(DomainError::NonFinite { .. }))
        ));
    }

    #[test]
    fn test_bare_array_and_bad_json() {
        let requests = parse_batch_json(r#"[{"formula": "NaCl"}]"#).unwrap();
        assert_eq!(requests, vec![FormulaRequest::new("NaCl")]);
        assert!(matches!(parse_batch_json("{not json"), Err(CalcError::Request(_))));
        assert!(matches!(
            parse_batch_json(r#"{"formulas": [{"voltage": 1.2}]}"#),
            Err(CalcError::Request(_))
        ));
    }

    #[test]
    fn test_concurrent_calls() {
        let formulas = ["H2O", "Ca(OH)2", "Fe2(SO4)3", "VOSO4", "((H2O)3)2", "K4(Fe(CN)6)"];
        let expected: Vec<f64> = formulas
            .iter()
            .map(|f| calculate(&FormulaRequest::new(f)).unwrap().molecular_weight)
            .collect();
        std::thread::scope(|scope| {
            let handles: Vec<_> = formulas
                .iter()
                .map(|f| scope.spawn(move || calculate(&FormulaRequest::new(f)).unwrap()))
                .collect();
            for (handle, expected) in handles.into_iter().zip(expected) {
                assert_eq!(handle.join().unwrap().molecular_weight, expected);
            }
        });
    }
}
