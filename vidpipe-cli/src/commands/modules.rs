//! Implementation of the 'modules' subcommand.

use crate::error::CliResult;

use vidpipe_core::registry;

use console::style;

/// Rows of (name, kind, description) for every registered module.
pub fn module_rows() -> Vec<(&'static str, &'static str, &'static str)> {
    registry::list()
        .iter()
        .map(|kind| (kind.key(), kind.type_name(), kind.description()))
        .collect()
}

pub fn run_modules() -> CliResult<()> {
    println!(
        "{}",
        style(format!("{:<24} {:<22} {}", "NAME", "KIND", "DESCRIPTION")).bold()
    );
    for (name, kind, description) in module_rows() {
        println!("{name:<24} {kind:<22} {description}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_every_registered_module() {
        let rows = module_rows();
        assert_eq!(rows.len(), registry::list().len());
        assert!(rows.iter().any(|(name, _, _)| *name == "chromakey"));
        assert!(rows.iter().any(|(name, kind, _)| *name == "utility.cut" && *kind == "utility.Cut"));
    }
}
