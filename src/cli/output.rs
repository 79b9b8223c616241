//! Colored terminal output helpers and the column formatter.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command. Machine-readable output
//! (codes from `get`, the `list` table) is plain text on stdout.

use console::{measure_text_width, style};

use crate::vault::Vault;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Align `rows` into columns.
///
/// Each cell is left-justified to the widest cell of its column and
/// followed by a tab; cells are joined with a single space and every
/// row ends with a newline. No rows means no output.
pub fn columnize<S: AsRef<str>>(rows: &[Vec<S>]) -> String {
    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let widths: Vec<usize> = (0..columns)
        .map(|col| {
            rows.iter()
                .filter_map(|row| row.get(col))
                .map(|cell| measure_text_width(cell.as_ref()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    for row in rows {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| {
                let cell = cell.as_ref();
                let pad = width.saturating_sub(measure_text_width(cell));
                format!("{cell}{}\t", " ".repeat(pad))
            })
            .collect();
        out.push_str(&cells.join(" "));
        out.push('\n');
    }
    out
}

/// Render the `list` report: a Name/Description header, a dashed rule,
/// then one row per record sorted by name.
pub fn secrets_table(vault: &Vault) -> String {
    let mut rows: Vec<Vec<String>> = vec![
        vec!["Name".into(), "Description".into()],
        vec!["----".into(), "-----------".into()],
    ];
    rows.extend(
        vault
            .iter()
            .map(|rec| vec![rec.name.clone(), rec.description.clone()]),
    );
    columnize(&rows)
}
