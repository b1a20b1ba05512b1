/// Module to calculate the atomic composition and molar mass of a chemical formula
///
/// Formulas may contain nested groups with multipliers, e.g. `Fe2(SO4)3` or `((H2O)3)2`.
/// Parsing is a single left-to-right scan: every `(` opens a new frame of counts, every `)`
/// closes it, multiplies it by the digits that follow and merges it into the enclosing frame.
/// Element symbols are checked against the periodic table as soon as they are read.
use super::periodic_table::{Element, lookup};
use crate::Electrochemistry::calc_trace::CalcTrace;
use log::{debug, info, warn};
use serde::Serialize;
use serde::ser::SerializeMap;
use std::collections::HashMap;
use thiserror::Error;

/// number of decimals every public scalar result is rounded to
pub const RESULT_DECIMALS: i32 = 3;

pub fn round_result(value: f64) -> f64 {
    let factor = 10f64.powi(RESULT_DECIMALS);
    (value * factor).round() / factor
}

/// errors of formula parsing
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormulaError {
    #[error("formula is empty")]
    Empty,
    #[error("unbalanced parentheses near '{fragment}'")]
    UnbalancedParentheses { fragment: String },
    #[error("empty group '()' at position {position}")]
    EmptyGroup { position: usize },
    #[error("malformed formula: unexpected '{fragment}' at position {position}")]
    MalformedToken { fragment: String, position: usize },
    #[error("zero count is not allowed: '{fragment}'")]
    ZeroCount { fragment: String },
    #[error("count is too large: '{fragment}'")]
    CountOverflow { fragment: String },
    #[error("unknown element: {symbol}")]
    UnknownElement { symbol: String },
}

/// Element counts of one formula in order of first appearance.
/// Entries point into the periodic table, so only known elements can be stored here.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementCounts {
    entries: Vec<(&'static Element, u32)>,
}

impl ElementCounts {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add(&mut self, element: &'static Element, count: u32, fragment: &str) -> Result<(), FormulaError> {
        match self.entries.iter_mut().find(|(e, _)| e.name == element.name) {
            Some((_, existing)) => {
                *existing = existing
                    .checked_add(count)
                    .ok_or_else(|| FormulaError::CountOverflow {
                        fragment: fragment.to_string(),
                    })?;
            }
            None => self.entries.push((element, count)),
        }
        Ok(())
    }

    // group multiplier
    fn scale(&mut self, multiplier: u32, fragment: &str) -> Result<(), FormulaError> {
        for (_, count) in self.entries.iter_mut() {
            *count = count
                .checked_mul(multiplier)
                .ok_or_else(|| FormulaError::CountOverflow {
                    fragment: fragment.to_string(),
                })?;
        }
        Ok(())
    }

    fn merge(&mut self, other: ElementCounts, fragment: &str) -> Result<(), FormulaError> {
        for (element, count) in other.entries {
            self.add(element, count, fragment)?;
        }
        Ok(())
    }

    /// number of atoms of the element, None if the formula has none
    pub fn get(&self, symbol: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(element, _)| element.name == symbol)
            .map(|(_, count)| *count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// (symbol, count) pairs in order of first appearance
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, u32)> + '_ {
        self.entries.iter().map(|(element, count)| (element.name, *count))
    }

    pub fn elements(&self) -> impl Iterator<Item = (&'static Element, u32)> + '_ {
        self.entries.iter().map(|(element, count)| (*element, *count))
    }

    pub fn symbols(&self) -> Vec<&'static str> {
        self.iter().map(|(symbol, _)| symbol).collect()
    }

    pub fn to_hashmap(&self) -> HashMap<String, usize> {
        self.iter()
            .map(|(symbol, count)| (symbol.to_string(), count as usize))
            .collect()
    }
}

impl Serialize for ElementCounts {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (symbol, count) in self.iter() {
            map.serialize_entry(symbol, &count)?;
        }
        map.end()
    }
}

struct FormulaParser<'a> {
    formula: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> FormulaParser<'a> {
    fn new(formula: &'a str) -> Self {
        Self {
            formula,
            bytes: formula.as_bytes(),
            pos: 0,
        }
    }

    fn skip_while(&mut self, predicate: fn(&u8) -> bool) {
        while self.bytes.get(self.pos).is_some_and(predicate) {
            self.pos += 1;
        }
    }

    // uppercase letter followed by all lowercase letters after it, so "Na" is never N + a
    fn read_symbol(&mut self) -> &'a str {
        let formula = self.formula;
        let start = self.pos;
        self.pos += 1;
        self.skip_while(u8::is_ascii_lowercase);
        &formula[start..self.pos]
    }

    // digits after a symbol or a closing bracket; no digits means 1
    fn read_count(&mut self, token_start: usize) -> Result<u32, FormulaError> {
        let digits_start = self.pos;
        self.skip_while(u8::is_ascii_digit);
        if digits_start == self.pos {
            return Ok(1);
        }
        let fragment = &self.formula[token_start..self.pos];
        let count: u32 = self.formula[digits_start..self.pos]
            .parse()
            .map_err(|_| FormulaError::CountOverflow {
                fragment: fragment.to_string(),
            })?;
        if count == 0 {
            return Err(FormulaError::ZeroCount {
                fragment: fragment.to_string(),
            });
        }
        Ok(count)
    }

    fn parse(mut self) -> Result<ElementCounts, FormulaError> {
        let mut root = ElementCounts::new();
        // open groups: position of '(' and counts collected inside it
        let mut groups: Vec<(usize, ElementCounts)> = Vec::new();

        while let Some(&byte) = self.bytes.get(self.pos) {
            match byte {
                b'(' => {
                    debug!("group opened at position {}", self.pos);
                    groups.push((self.pos, ElementCounts::new()));
                    self.pos += 1;
                }
                b')' => {
                    let Some((open, mut group)) = groups.pop() else {
                        return Err(FormulaError::UnbalancedParentheses {
                            fragment: self.formula[..=self.pos].to_string(),
                        });
                    };
                    self.pos += 1;
                    if group.is_empty() {
                        return Err(FormulaError::EmptyGroup { position: open });
                    }
                    let multiplier = self.read_count(open)?;
                    let fragment = &self.formula[open..self.pos];
                    group.scale(multiplier, fragment)?;
                    debug!("group {} expanded with multiplier {}", fragment, multiplier);
                    let parent = match groups.last_mut() {
                        Some((_, frame)) => frame,
                        None => &mut root,
                    };
                    parent.merge(group, fragment)?;
                }
                b'A'..=b'Z' => {
                    let start = self.pos;
                    let symbol = self.read_symbol();
                    let element = lookup(symbol).ok_or_else(|| FormulaError::UnknownElement {
                        symbol: symbol.to_string(),
                    })?;
                    let count = self.read_count(start)?;
                    let fragment = &self.formula[start..self.pos];
                    debug!("element found: {}, number of atoms {}", symbol, count);
                    let frame = match groups.last_mut() {
                        Some((_, frame)) => frame,
                        None => &mut root,
                    };
                    frame.add(element, count, fragment)?;
                }
                _ => {
                    // only ASCII bytes are ever consumed, so pos is a char boundary
                    let fragment = self.formula[self.pos..]
                        .chars()
                        .next()
                        .map(String::from)
                        .unwrap_or_default();
                    return Err(FormulaError::MalformedToken {
                        fragment,
                        position: self.pos,
                    });
                }
            }
        }

        if let Some((open, _)) = groups.last() {
            return Err(FormulaError::UnbalancedParentheses {
                fragment: self.formula[*open..].to_string(),
            });
        }
        Ok(root)
    }
}

/// Parses a chemical formula and returns the elements and their counts in order of first
/// appearance.
/// # Examples
/// ```
/// use MolCalc::MolarMass::molmass::parse_formula;
/// let counts = parse_formula("Fe2(SO4)3").unwrap();
/// assert_eq!(counts.get("O"), Some(12));
/// assert_eq!(counts.symbols(), vec!["Fe", "S", "O"]);
/// ```
pub fn parse_formula(formula: &str) -> Result<ElementCounts, FormulaError> {
    if formula.is_empty() {
        warn!("empty formula rejected");
        return Err(FormulaError::Empty);
    }
    debug!("parsing formula: {}", formula);
    FormulaParser::new(formula).parse().inspect_err(|e| {
        warn!("formula {} rejected: {}", formula, e);
    })
}

/// one row of the molar mass breakdown
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementContribution {
    pub symbol: &'static str,
    pub count: u32,
    pub atomic_mass: f64,
    pub subtotal: f64,
}

/// Sums atomic mass times count over all elements. The total is rounded only once, after
/// summation; subtotals in the breakdown are kept unrounded.
pub fn weigh(counts: &ElementCounts) -> (f64, Vec<ElementContribution>) {
    let mut total = 0.0;
    let mut breakdown = Vec::with_capacity(counts.len());
    for (element, count) in counts.elements() {
        let subtotal = element.atomic_mass * count as f64;
        total += subtotal;
        breakdown.push(ElementContribution {
            symbol: element.name,
            count,
            atomic_mass: element.atomic_mass,
            subtotal,
        });
    }
    (round_result(total), breakdown)
}

/// Molar mass of a formula together with how it was obtained
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MolecularWeight {
    pub formula: String,
    /// g/mol, rounded to 3 decimals
    pub value: f64,
    pub elements: ElementCounts,
    pub breakdown: Vec<ElementContribution>,
    pub trace: CalcTrace,
}

// Function to calculate the molar mass of a substance given its chemical formula
pub fn calculate_molar_mass(formula: &str) -> Result<MolecularWeight, FormulaError> {
    let elements = parse_formula(formula)?;
    let (value, breakdown) = weigh(&elements);
    let mut trace = CalcTrace::new();
    for row in &breakdown {
        trace.push(
            &format!("{} x {} ({:.3} g/mol)", row.symbol, row.count, row.atomic_mass),
            row.subtotal,
            "g/mol",
        );
    }
    trace.push("molecular weight", value, "g/mol");
    info!("molar mass of {}: {:.3} g/mol", formula, value);
    Ok(MolecularWeight {
        formula: formula.to_string(),
        value,
        elements,
        breakdown,
        trace,
    })
}

// Function to calculate the molar masses of a vector of chemical formulas
pub fn calculate_molar_mass_of_vector_of_subs(
    vec_of_formulae: &[&str],
) -> Result<Vec<f64>, FormulaError> {
    vec_of_formulae
        .iter()
        .map(|formula| calculate_molar_mass(formula).map(|mw| mw.value))
        .collect()
}
