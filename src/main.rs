use std::{
    fmt::{self, Display, Formatter},
    sync::LazyLock,
};

use formulae::{AtomicDatabase, Charged, Formula, Massive, Result};
use log::{debug, error};
use miette::{Diagnostic, GraphicalReportHandler, GraphicalTheme};
use rust_decimal::Decimal;
use rustyline::{DefaultEditor, error::ReadlineError};

static DB: LazyLock<AtomicDatabase> = LazyLock::new(AtomicDatabase::default);

fn main() -> rustyline::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let mut rl = DefaultEditor::new()?;
    loop {
        let line = match rl.readline("Formula [Adduct]: ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e),
        };
        if line.trim().is_empty() {
            continue;
        }
        rl.add_history_entry(&line)?;

        match formula_info(&line) {
            Ok(info) => println!("{info}"),
            Err(diagnostic) => render_error(*diagnostic),
        }
    }
    Ok(())
}

struct FormulaInfo<'a> {
    formula: Formula<'a>,
    final_formula: String,
}

fn formula_info(line: &str) -> Result<FormulaInfo<'static>> {
    // Anything after the first run of whitespace is the adduct
    let (formula, adduct) = match line.trim().split_once(char::is_whitespace) {
        Some((formula, adduct)) => (formula, Some(adduct)),
        None => (line.trim(), None),
    };
    debug!("looking up {formula:?} with the adduct {adduct:?}");

    let formula = Formula::from_hill(&DB, formula, adduct, formulae::Metadata::default())?;
    let final_formula = formula.final_formula_with_adduct()?;
    Ok(FormulaInfo {
        formula,
        final_formula,
    })
}

impl Display for FormulaInfo<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            formula,
            final_formula,
        } = self;

        writeln!(f, "Hill Formula: {formula}")?;
        writeln!(f, "Formula Type: {}", formula.formula_type())?;
        writeln!(
            f,
            "Monoisotopic Mass: {}",
            rounded(formula.monoisotopic_mass(), 6)
        )?;
        writeln!(f, "Charge: {}", i64::from(formula.charge()))?;

        if let Some(adduct) = formula.adduct() {
            writeln!(f, "Adduct: {adduct}")?;
            writeln!(f, "Final Formula: {final_formula}")?;
            writeln!(
                f,
                "Monoisotopic m/z: {}",
                rounded(formula.monoisotopic_mass_with_adduct(), 6)
            )?;
        }
        Ok(())
    }
}

fn render_error(diagnostic: impl Into<Box<dyn Diagnostic + 'static>>) {
    let mut buf = String::new();
    match GraphicalReportHandler::new_themed(GraphicalTheme::unicode())
        .render_report(&mut buf, diagnostic.into().as_ref())
    {
        Ok(()) => println!("{buf}"),
        Err(e) => error!("failed to render an error report: {e}"),
    }
}

fn rounded(value: impl Into<Decimal>, decimal_points: u32) -> String {
    let value = value.into().round_dp(decimal_points);
    format!("{value}")
}
