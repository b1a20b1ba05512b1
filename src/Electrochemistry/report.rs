use super::calc_trace::CalcTrace;
use crate::MolarMass::molmass::MolecularWeight;
use prettytable::{Table, row};

////////////////////////INPUT/OUTPUT////////////////////////////////////////////////////////

/// Element analysis table: element, count, atomic mass, subtotal and the total in the last row
pub fn breakdown_table(mw: &MolecularWeight) -> Table {
    let mut table = Table::new();
    table.add_row(row!["element", "count", "atomic mass, g/mol", "total, g/mol"]);
    for r in &mw.breakdown {
        table.add_row(row![
            r.symbol,
            r.count,
            format!("{:.3}", r.atomic_mass),
            format!("{:.3}", r.subtotal)
        ]);
    }
    table.add_row(row!["molecular weight", "", "", format!("{:.3}", mw.value)]);
    table
}

/// Two-column table of a calculation trace
pub fn trace_table(trace: &CalcTrace) -> Table {
    let mut table = Table::new();
    table.add_row(row!["quantity", "value"]);
    for step in trace.steps() {
        table.add_row(row![step.label, step.formatted_value()]);
    }
    table
}

pub fn pretty_print_molar_mass(mw: &MolecularWeight) {
    println!("__________formula: {}__________", mw.formula);
    breakdown_table(mw).printstd();
}

pub fn pretty_print_trace(title: &str, trace: &CalcTrace) {
    println!("__________{}__________", title);
    trace_table(trace).printstd();
}
