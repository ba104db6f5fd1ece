//! Text rendering of decision table rules

use dmnc_core::DecisionTable;

/// Render a table as a pipe-delimited grid.
///
/// ```text
/// Eligibility (hit policy U)
/// | # | age   | income  || approved | annotation        |
/// |---|-------|---------||----------|-------------------|
/// | 1 | >= 18 | >= 1000 || true     | adult with income |
/// ```
///
/// Input columns are separated from output columns by `||`. The annotation
/// column only appears when some rule has one.
pub fn rule_listing(table: &DecisionTable) -> String {
    let with_annotations = table.rules.iter().any(|r| r.annotation.is_some());
    let input_count = table.inputs.len();

    let mut header: Vec<String> = vec!["#".to_string()];
    header.extend(table.inputs.iter().map(|i| i.name.clone()));
    header.extend(table.outputs.iter().map(|o| o.name.clone()));
    if with_annotations {
        header.push("annotation".to_string());
    }

    let rows: Vec<Vec<String>> = table
        .rules
        .iter()
        .map(|rule| {
            let mut row = vec![rule.id.clone()];
            row.extend(rule.inputs.iter().map(|c| c.text.trim().to_string()));
            row.extend(rule.outputs.iter().map(|c| c.text.trim().to_string()));
            if with_annotations {
                row.push(rule.annotation.clone().unwrap_or_default());
            }
            row
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|h| h.chars().count()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    // Column after which the input/output divider goes
    let divider = input_count + 1;
    let render = |cells: &[String]| -> String {
        let mut line = String::new();
        for (index, (cell, width)) in cells.iter().zip(&widths).enumerate() {
            line.push_str(if index == divider { "||" } else { "|" });
            line.push(' ');
            line.push_str(cell);
            line.push_str(&" ".repeat(width - cell.chars().count()));
            line.push(' ');
        }
        line.push('|');
        line
    };

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(w + 2)).collect();
    let mut separator = String::new();
    for (index, dashes) in rule.iter().enumerate() {
        separator.push_str(if index == divider { "||" } else { "|" });
        separator.push_str(dashes);
    }
    separator.push('|');

    let mut lines = vec![
        format!("{} (hit policy {})", table.name, table.hit_policy.code()),
        render(header.as_slice()),
        separator,
    ];
    lines.extend(rows.iter().map(|row| render(row.as_slice())));
    lines.join("\n")
}
