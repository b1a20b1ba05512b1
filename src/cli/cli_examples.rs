use crate::Electrochemistry::flow_battery::ElectrochemCalculator;
use crate::Electrochemistry::report::{pretty_print_molar_mass, pretty_print_trace};
use crate::MolarMass::molmass::calculate_molar_mass;
use crate::calc_api::{CalcError, FormulaRequest};

/// formula, electron transfer, voltage, solubility
const DEMO_CASES: [(&str, Option<f64>, Option<f64>, Option<f64>); 6] = [
    ("H2O", None, None, None),
    ("NaCl", None, None, None),
    ("H2SO4", None, None, None),
    ("Ca(OH)2", None, None, None),
    ("Fe2(SO4)3", None, None, None),
    // vanadyl sulfate, electrolyte of the vanadium flow battery
    ("VOSO4", Some(1.0), Some(1.2), Some(2.0)),
];

pub fn demo_requests() -> Vec<FormulaRequest> {
    DEMO_CASES
        .iter()
        .map(|&(formula, electron_transfer, voltage, solubility)| FormulaRequest {
            formula: formula.to_string(),
            electron_transfer,
            voltage,
            solubility,
        })
        .collect()
}

/// Prints the element analysis of the formula and, when the request has the inputs for
/// them, the active material mass and solution energy density calculations.
pub fn print_formula_report(
    calculator: &ElectrochemCalculator,
    request: &FormulaRequest,
) -> Result<(), CalcError> {
    let formula = request.formula.as_str();
    let mw = calculate_molar_mass(formula)?;
    pretty_print_molar_mass(&mw);

    if let (Some(z), Some(u)) = (request.electron_transfer, request.voltage) {
        let mass = calculator.active_material_mass(formula, z, u)?;
        pretty_print_trace(
            &format!(
                "mass to store {} kWh",
                calculator.constants.stored_energy_kwh
            ),
            &mass.trace,
        );
        println!("active material mass: {:.3} g", mass.value);

        if let Some(c) = request.solubility {
            let density = calculator.solution_energy_density(formula, z, u, c)?;
            pretty_print_trace("solution energy density", &density.trace);
            println!("solution energy density: {:.3} kWh/L", density.value);
        }
    }
    Ok(())
}

/// Runs the built-in set of formulas; a failing formula is reported and the run goes on.
pub fn demonstration(calculator: &ElectrochemCalculator) {
    println!("\n=== Molecular weight calculator ===");
    for request in demo_requests() {
        if let Err(e) = print_formula_report(calculator, &request) {
            println!("{}: error - {}", request.formula, e);
        }
        println!("_____________________________________________________________");
    }
}
