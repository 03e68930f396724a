use once_cell::sync::Lazy;
use regex::Regex;

/// Column letters followed by row digits, anywhere in the formula text.
static CELL_REFERENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Z]+)([0-9]+)").expect("cell reference pattern is valid"));

pub fn is_formula_text(text: &str) -> bool {
    text.starts_with('=')
}

/// Shift the row part of every `<LETTERS><DIGITS>` token by `delta_row`.
///
/// Tokens are collected once from the original text and then replaced in
/// order with plain substring replacement, so a repeated token is rewritten
/// everywhere it occurs. `$` markers, ranges, sheet prefixes and names are
/// not interpreted: any matching token moves.
pub fn shift_formula_rows(formula: &str, delta_row: i64) -> String {
    let mut shifted = formula.to_string();
    for captures in CELL_REFERENCE.captures_iter(formula) {
        let Some(row) = captures[2]
            .parse::<i64>()
            .ok()
            .and_then(|row| row.checked_add(delta_row))
        else {
            continue;
        };
        let old_reference = &captures[0];
        let new_reference = format!("{}{}", &captures[1], row);
        shifted = shifted.replace(old_reference, &new_reference);
    }
    shifted
}
