#[allow(non_snake_case)]
pub mod Electrochemistry;
#[allow(non_snake_case)]
pub mod MolarMass;
pub mod calc_api;
pub mod cli;
pub mod settings;

pub use Electrochemistry::flow_battery::{active_material_mass, solution_energy_density};
pub use MolarMass::molmass::{calculate_molar_mass, parse_formula};
pub use calc_api::CalcError;
