/// eng
/// Static table of atomic weights of all 118 elements with a symbol index built once and
/// shared read-only by every calculation.
pub mod periodic_table;
/// eng
/// The module takes a chemical formula as a String and produces:
/// 1) ordered element counts (order of first appearance in the formula)
/// 2) molar mass with a per element breakdown
///
/// Nested groups with multipliers are supported, e.g. Fe2(SO4)3 or ((H2O)3)2.
/// Unknown element symbols, unbalanced brackets and zero counts are errors.
/// # Examples
/// ```
/// use MolCalc::MolarMass::molmass::calculate_molar_mass;
/// let mw = calculate_molar_mass("Ca(OH)2").unwrap();
/// assert_eq!(mw.value, 74.092);
/// ```
pub mod molmass;
