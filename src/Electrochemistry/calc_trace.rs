//! Structured record of a calculation.
//!
//! Every derivation returns its number together with a `CalcTrace`: the ordered list of
//! intermediate quantities that were used to get there. Callers decide how to show it;
//! `render` gives the plain text form used in `calculation_details`, the `report`
//! module prints it as a table.
use serde::Serialize;
use std::fmt;

/// One labelled intermediate quantity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TraceStep {
    pub label: String,
    pub value: f64,
    pub unit: String,
}

impl TraceStep {
    pub fn new(label: &str, value: f64, unit: &str) -> Self {
        Self {
            label: label.to_string(),
            value,
            unit: unit.to_string(),
        }
    }
    /// value with 3 decimals followed by the unit, e.g. `31.093 mol`
    pub fn formatted_value(&self) -> String {
        if self.unit.is_empty() {
            format!("{:.3}", self.value)
        } else {
            format!("{:.3} {}", self.value, self.unit)
        }
    }
}

impl fmt::Display for TraceStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.formatted_value())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CalcTrace {
    steps: Vec<TraceStep>,
}

impl CalcTrace {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn push(&mut self, label: &str, value: f64, unit: &str) {
        self.steps.push(TraceStep::new(label, value, unit));
    }

    /// appends all steps of another trace, keeping their order
    pub fn extend(&mut self, other: CalcTrace) {
        self.steps.extend(other.steps);
    }

    pub fn steps(&self) -> &[TraceStep] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// first step with the given label
    pub fn find(&self, label: &str) -> Option<&TraceStep> {
        self.steps.iter().find(|step| step.label == label)
    }

    pub fn render(&self) -> Vec<String> {
        self.steps.iter().map(|step| step.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps_keep_insertion_order() {
        let mut trace = CalcTrace::new();
        trace.push("Faraday constant", 96485.0, "C/mol");
        trace.push("moles required", 31.09291599730528, "mol");
        trace.push("electron transfer", 1.0, "");
        assert_eq!(trace.len(), 3);
        let labels: Vec<&str> = trace.steps().iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels, vec!["Faraday constant", "moles required", "electron transfer"]);
        assert_eq!(
            trace.render(),
            vec![
                "Faraday constant: 96485.000 C/mol".to_string(),
                "moles required: 31.093 mol".to_string(),
                "electron transfer: 1.000".to_string(),
            ]
        );
    }

    #[test]
    fn test_extend_and_find() {
        let mut first = CalcTrace::new();
        first.push("a", 1.0, "g");
        let mut second = CalcTrace::new();
        second.push("b", 2.0, "g");
        second.push("a", 3.0, "g");
        first.extend(second);
        assert_eq!(first.len(), 3);
        assert_eq!(first.find("a").unwrap().value, 1.0);
        assert_eq!(first.find("b").unwrap().formatted_value(), "2.000 g");
        assert!(first.find("c").is_none());
        assert!(CalcTrace::new().is_empty());
    }

    #[test]
    fn test_serializes_as_list() {
        let mut trace = CalcTrace::new();
        trace.push("energy density", 0.064, "kWh/L");
        let json = serde_json::to_value(&trace).unwrap();
        assert_eq!(
            json,
            serde_json::json!([{"label": "energy density", "value": 0.064, "unit": "kWh/L"}])
        );
    }
}
