use super::cli_examples::{demonstration, print_formula_report};
use crate::Electrochemistry::flow_battery::ElectrochemCalculator;
use crate::calc_api::{CalcError, FormulaRequest, calculate_batch_json};
use log::error;
use std::fs;
use std::io::{self, Write};

const USAGE: &str = "usage:
    molcalc                          interactive menu
    molcalc --demo                   built-in examples
    molcalc --batch <file.json>      calculate a batch request, print JSON
    molcalc <FORMULA> [z U [c]]      one formula; z - electron transfer,
                                     U - voltage (V), c - solubility (mol/L)";

pub fn run_interactive_menu(calculator: &ElectrochemCalculator) {
    loop {
        show_main_menu();
        let Some(choice) = get_user_input() else {
            break;
        };

        match choice.trim() {
            "1" => demonstration(calculator),
            "2" => formula_menu(calculator),
            "3" => batch_menu(calculator),
            "0" => {
                println!("Goodbye!");
                break;
            }
            _ => println!("Invalid choice. Please try again."),
        }
    }
}
/* colors
Blue (\x1b[34m) - Welcome header text

Yellow (\x1b[33m) - Menu options

Cyan (\x1b[36m) - prompts

Reset (\x1b[0m) - Returns to normal color after each colored section
*/
fn show_main_menu() {
    println!("\x1b[34m\n Molecular weight and flow battery electrolyte calculator\n \x1b[0m");
    println!("\x1b[33m1. Examples\x1b[0m");
    println!("\x1b[33m2. Calculate formula\x1b[0m");
    println!("\x1b[33m3. Batch from JSON file\x1b[0m");
    println!("\x1b[33m0. Exit\x1b[0m");
    prompt("Enter your choice: ");
}

fn prompt(text: &str) {
    print!("\x1b[36m{}\x1b[0m", text);
    let _ = io::stdout().flush();
}

// None on end of input or read failure
fn get_user_input() -> Option<String> {
    let mut input = String::new();
    match io::stdin().read_line(&mut input) {
        Ok(0) => None,
        Ok(_) => Some(input),
        Err(e) => {
            error!("failed to read input: {}", e);
            None
        }
    }
}

fn formula_menu(calculator: &ElectrochemCalculator) {
    prompt("Formula: ");
    let Some(formula) = get_user_input() else {
        return;
    };
    prompt("Electron transfer, voltage, solubility (optional, space separated): ");
    let params = get_user_input().unwrap_or_default();
    let mut args = vec![formula.trim().to_string()];
    args.extend(params.split_whitespace().map(String::from));
    match parse_formula_args(&args) {
        Ok(request) => {
            if let Err(e) = print_formula_report(calculator, &request) {
                println!("{}: error - {}", request.formula, e);
            }
        }
        Err(e) => println!("{}", e),
    }
}

fn batch_menu(calculator: &ElectrochemCalculator) {
    prompt("Path to JSON file: ");
    let Some(path) = get_user_input() else {
        return;
    };
    match run_batch_file(calculator, path.trim()) {
        Ok(json) => println!("{}", json),
        Err(e) => println!("{}", e),
    }
}

fn parse_number(name: &str, text: &str) -> Result<f64, CalcError> {
    text.parse::<f64>()
        .map_err(|_| CalcError::Request(format!("{} is not a number: '{}'", name, text)))
}

/// FORMULA [z U [c]]
pub fn parse_formula_args(args: &[String]) -> Result<FormulaRequest, CalcError> {
    let Some(formula) = args.first() else {
        return Err(CalcError::Request(USAGE.to_string()));
    };
    let mut request = FormulaRequest::new(formula);
    match &args[1..] {
        [] => {}
        [z, u] => {
            request = request.with_cell(parse_number("electron transfer", z)?, parse_number("voltage", u)?);
        }
        [z, u, c] => {
            request = request
                .with_cell(parse_number("electron transfer", z)?, parse_number("voltage", u)?)
                .with_solubility(parse_number("solubility", c)?);
        }
        _ => {
            return Err(CalcError::Request(format!(
                "expected electron transfer and voltage, optionally solubility\n{}",
                USAGE
            )));
        }
    }
    Ok(request)
}

pub fn run_batch_file(calculator: &ElectrochemCalculator, path: &str) -> Result<String, CalcError> {
    let json = fs::read_to_string(path)
        .map_err(|e| CalcError::Request(format!("failed to read '{}': {}", path, e)))?;
    calculate_batch_json(calculator, &json)
}

/// Non-interactive mode, `args` without the program name
pub fn run_with_args(calculator: &ElectrochemCalculator, args: &[String]) -> Result<(), CalcError> {
    match args.first().map(String::as_str) {
        None => run_interactive_menu(calculator),
        Some("-h") | Some("--help") => println!("{}", USAGE),
        Some("--demo") => demonstration(calculator),
        Some("--batch") => {
            let path = args
                .get(1)
                .ok_or_else(|| CalcError::Request(format!("--batch needs a file\n{}", USAGE)))?;
            println!("{}", run_batch_file(calculator, path)?);
        }
        Some(_) => {
            let request = parse_formula_args(args)?;
            print_formula_report(calculator, &request)?;
        }
    }
    Ok(())
}
