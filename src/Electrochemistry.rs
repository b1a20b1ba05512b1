/// Ordered record of intermediate quantities of a calculation
pub mod calc_trace;
/// eng
/// Redox flow battery electrolyte estimates:
/// 1) mass of active material required to store 1 kWh at given voltage and electron transfer number
/// 2) energy density of a solution of the active material at given solubility
/// # Examples
/// ```
/// use MolCalc::Electrochemistry::flow_battery::solution_energy_density;
/// let d = solution_energy_density("VOSO4", 1.0, 1.2, 2.0).unwrap();
/// assert_eq!(d.value, 0.064);
/// ```
pub mod flow_battery;
/// tables for console output
pub mod report;
