use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use qml_core::QuestionnaireSummary;
use qml_ingest::{Diagnostics, Severity};
use qml_model::{Page, Questionnaire, Transition, VarPlace};

pub fn summary_table(summary: &QuestionnaireSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Metric"), header_cell("Count")]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    let rows: [(&str, usize, Option<Color>); 10] = [
        ("Pages", summary.pages, None),
        ("Declared pages", summary.declared_pages, None),
        ("Undeclared pages", summary.undeclared_pages, Some(Color::Yellow)),
        ("Transitions", summary.transitions, None),
        ("Backward transitions", summary.backward_transitions, Some(Color::Yellow)),
        ("Self-loops", summary.self_loops, None),
        ("Declared variables", summary.declared_variables, None),
        ("Used variables", summary.used_variables, None),
        ("Unused variables", summary.unused_variables, Some(Color::Yellow)),
        ("Shown variables", summary.shown_variables, None),
    ];
    for (label, count, highlight) in rows {
        let count = match highlight {
            Some(color) => count_cell(count, color),
            None => Cell::new(count),
        };
        table.add_row(vec![Cell::new(label), count]);
    }
    table.add_row(vec![
        Cell::new("Sortable"),
        if summary.sortable {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no (cyclic)")
                .fg(Color::Red)
                .add_attribute(Attribute::Bold)
        },
    ]);
    table
}

/// Diagnostics table, or `None` when the run was clean.
pub fn diagnostics_table(diagnostics: &Diagnostics) -> Option<Table> {
    if diagnostics.is_empty() {
        return None;
    }
    let mut entries: Vec<_> = diagnostics.iter().collect();
    entries.sort_by(|a, b| b.severity.cmp(&a.severity));
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Page"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Center);
    for entry in entries {
        table.add_row(vec![
            severity_cell(entry.severity),
            page_cell(entry.page.as_deref()),
            Cell::new(&entry.message),
        ]);
    }
    Some(table)
}

/// Pages in the given order with their ledger counts.
pub fn pages_table<'a>(pages: impl IntoIterator<Item = &'a Page>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("#"),
        header_cell("Page"),
        header_cell("Declared"),
        header_cell("Transitions"),
        header_cell("Sources"),
        header_cell("Variables"),
        header_cell("Headers"),
    ]);
    apply_table_style(&mut table);
    for column in [0, 3, 4, 5, 6] {
        align_column(&mut table, column, CellAlignment::Right);
    }
    align_column(&mut table, 2, CellAlignment::Center);
    for (position, page) in pages.into_iter().enumerate() {
        table.add_row(vec![
            dim_cell(position),
            page_cell(Some(page.uid())),
            if page.declared {
                Cell::new("✓").fg(Color::Green)
            } else {
                Cell::new("no").fg(Color::Yellow)
            },
            Cell::new(page.transition_count()),
            Cell::new(page.sources().count()),
            Cell::new(page.variables.len()),
            Cell::new(page.headers().count()),
        ]);
    }
    table
}

pub fn transitions_table(transitions: &[Transition]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("#"),
        header_cell("Target"),
        header_cell("Distance"),
        header_cell("Condition"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for transition in transitions {
        table.add_row(vec![
            page_cell(Some(&transition.source)),
            Cell::new(transition.index),
            page_cell(Some(&transition.target)),
            distance_cell(transition.distance),
            condition_cell(transition),
        ]);
    }
    table
}

pub fn conditions_table(questionnaire: &Questionnaire) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Source"),
        header_cell("#"),
        header_cell("Target"),
        header_cell("Condition"),
        header_cell("Translated"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for transition in questionnaire.transitions() {
        table.add_row(vec![
            page_cell(Some(&transition.source)),
            Cell::new(transition.index),
            page_cell(Some(&transition.target)),
            match transition.condition.as_deref() {
                Some(condition) => Cell::new(condition),
                None => dim_cell("-"),
            },
            condition_cell(transition),
        ]);
    }
    table
}

/// Declared variables with the pages that use them.
pub fn variables_table(questionnaire: &Questionnaire) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Variable"),
        header_cell("Type"),
        header_cell("Pages"),
        header_cell("Places"),
    ]);
    apply_table_style(&mut table);
    for variable in questionnaire.variables.list_all_vars() {
        let uses: Vec<(&str, VarPlace)> = questionnaire
            .pages()
            .iter()
            .filter_map(|page| {
                let used = page.variables.get(variable.name())?;
                Some((page.uid(), used.place()?))
            })
            .collect();
        let pages_cell = if uses.is_empty() {
            Cell::new("unused").fg(Color::Yellow)
        } else {
            Cell::new(
                uses.iter()
                    .map(|(uid, _)| *uid)
                    .collect::<Vec<_>>()
                    .join(", "),
            )
        };
        let mut places: Vec<&str> = uses.iter().map(|(_, place)| place.as_str()).collect();
        places.sort_unstable();
        places.dedup();
        table.add_row(vec![
            Cell::new(variable.name()).add_attribute(Attribute::Bold),
            Cell::new(variable.var_type()),
            pages_cell,
            Cell::new(places.join(", ")),
        ]);
    }
    table
}

/// Names from the unused-variable query, split by which side is missing.
pub fn unused_table(questionnaire: &Questionnaire) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Variable"), header_cell("Problem")]);
    apply_table_style(&mut table);
    for name in questionnaire.find_unused_variables() {
        let problem = if questionnaire.variables.contains(&name) {
            Cell::new("declared, never used").fg(Color::Yellow)
        } else {
            Cell::new("used, never declared").fg(Color::Red)
        };
        table.add_row(vec![Cell::new(name), problem]);
    }
    table
}

/// Variables shown in page text, with the pages that show them.
pub fn shown_table(questionnaire: &Questionnaire) -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("Variable"), header_cell("Shown on")]);
    apply_table_style(&mut table);
    for name in questionnaire.shown_variable_names() {
        let pages: Vec<&str> = questionnaire
            .pages()
            .iter()
            .filter(|page| {
                page.variables
                    .get(&name)
                    .is_some_and(|variable| variable.is_shown())
            })
            .map(Page::uid)
            .collect();
        table.add_row(vec![Cell::new(&name), Cell::new(pages.join(", "))]);
    }
    table
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(80);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn page_cell(uid: Option<&str>) -> Cell {
    match uid {
        Some(uid) => Cell::new(uid).fg(Color::Blue),
        None => dim_cell("-"),
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Warning => Cell::new("WARN").fg(Color::Yellow),
        Severity::Info => dim_cell("INFO"),
    }
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

fn distance_cell(distance: Option<i64>) -> Cell {
    match distance {
        Some(value) if value <= 0 => Cell::new(value).fg(Color::Red),
        Some(value) => Cell::new(value),
        None => dim_cell("-"),
    }
}

fn condition_cell(transition: &Transition) -> Cell {
    if transition.is_conditional() {
        Cell::new(&transition.condition_new)
    } else {
        dim_cell(&transition.condition_new)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
