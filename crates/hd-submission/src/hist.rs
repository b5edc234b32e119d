//! Tables laid out from histograms.

use hd_core::Result;
use hd_root::{HistRef, hist_axis_variables};

use crate::table::Table;

/// Table holding only the axes of `hist` as independent variables.
///
/// Add the contents with [`hd_root::hist_as_variable`] afterwards, read with the
/// same `include_flow`. `renames` and `units` are keyed by axis id (`x`, `y`).
pub fn hist_base_table(
    name: &str,
    hist: HistRef<'_>,
    include_flow: bool,
    renames: &[(&str, &str)],
    units: &[(&str, &str)],
) -> Result<Table> {
    let mut table = Table::new(name)?;
    for variable in hist_axis_variables(hist, include_flow, renames, units)? {
        table.add_variable(variable);
    }
    tracing::debug!("table '{name}' laid out from histogram '{}'", hist.name());
    Ok(table)
}
