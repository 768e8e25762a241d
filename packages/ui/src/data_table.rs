//! Sortable, searchable table.
//!
//! Rows are plain strings plus an optional numeric sort key per cell, so the
//! sorting and search logic stays testable without rendering.

use std::cmp::Ordering;

use dioxus::prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub key: &'static str,
    pub label: &'static str,
}

impl Column {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SortValue {
    Text(String),
    Number(f64),
}

impl SortValue {
    fn compare(&self, other: &SortValue) -> Ordering {
        match (self, other) {
            (SortValue::Number(a), SortValue::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (SortValue::Text(a), SortValue::Text(b)) => a.cmp(b),
            // Numbers before text when a column mixes both
            (SortValue::Number(_), SortValue::Text(_)) => Ordering::Less,
            (SortValue::Text(_), SortValue::Number(_)) => Ordering::Greater,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub text: String,
    pub sort: SortValue,
    /// Makes the cell a link.
    pub href: Option<String>,
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            sort: SortValue::Text(text.clone()),
            text,
            href: None,
        }
    }

    /// Displayed as `text`, sorted by `value`.
    pub fn number(text: impl Into<String>, value: f64) -> Self {
        Self {
            text: text.into(),
            sort: SortValue::Number(value),
            href: None,
        }
    }

    pub fn link(mut self, href: impl Into<String>) -> Self {
        self.href = Some(href.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub id: String,
    pub cells: Vec<Cell>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    fn arrow(self) -> &'static str {
        match self {
            SortDirection::Asc => "↑",
            SortDirection::Desc => "↓",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SortState {
    pub column: Option<usize>,
    pub direction: SortDirection,
}

impl SortState {
    /// Header click: the same column flips direction, a new column starts ascending.
    pub fn toggle(self, column: usize) -> Self {
        if self.column == Some(column) {
            let direction = match self.direction {
                SortDirection::Asc => SortDirection::Desc,
                SortDirection::Desc => SortDirection::Asc,
            };
            Self {
                column: Some(column),
                direction,
            }
        } else {
            Self {
                column: Some(column),
                direction: SortDirection::Asc,
            }
        }
    }
}

/// Rows whose cell texts, joined with spaces and lower-cased, contain `needle`.
pub fn filter_rows(rows: &[Row], needle: &str) -> Vec<Row> {
    let needle = needle.to_lowercase();
    rows.iter()
        .filter(|row| {
            let haystack = row
                .cells
                .iter()
                .map(|c| c.text.as_str())
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();
            haystack.contains(&needle)
        })
        .cloned()
        .collect()
}

/// Stable sort by the selected column; unsorted state keeps input order.
pub fn sort_rows(mut rows: Vec<Row>, sort: SortState) -> Vec<Row> {
    let Some(column) = sort.column else {
        return rows;
    };
    rows.sort_by(|a, b| {
        let ord = match (a.cells.get(column), b.cells.get(column)) {
            (Some(x), Some(y)) => x.sort.compare(&y.sort),
            _ => Ordering::Equal,
        };
        match sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    rows
}

#[component]
pub fn DataTable(
    columns: Vec<Column>,
    rows: Vec<Row>,
    #[props(default)] on_edit: Option<EventHandler<String>>,
    #[props(default)] on_delete: Option<EventHandler<String>>,
) -> Element {
    let mut search = use_signal(String::new);
    let mut sort = use_signal(SortState::default);

    let show_actions = on_edit.is_some() || on_delete.is_some();
    let span = columns.len() + usize::from(show_actions);
    let visible = sort_rows(filter_rows(&rows, &search.read()), sort());

    rsx! {
        div {
            class: "data-table",
            div {
                class: "data-table__search",
                input {
                    r#type: "text",
                    class: "form-input",
                    placeholder: "Search...",
                    value: "{search}",
                    oninput: move |e| search.set(e.value()),
                }
            }
            div {
                class: "data-table__scroll",
                table {
                    thead {
                        tr {
                            for (i, column) in columns.iter().enumerate() {
                                th {
                                    key: "{column.key}",
                                    class: "data-table__header",
                                    onclick: move |_| sort.set(sort().toggle(i)),
                                    "{column.label}"
                                    if sort().column == Some(i) {
                                        span { class: "data-table__arrow", "{sort().direction.arrow()}" }
                                    }
                                }
                            }
                            if show_actions {
                                th { "Actions" }
                            }
                        }
                    }
                    tbody {
                        for row in visible.iter().cloned() {
                            tr {
                                key: "{row.id}",
                                for cell in row.cells.iter().cloned() {
                                    td {
                                        if let Some(href) = cell.href {
                                            Link { to: href, "{cell.text}" }
                                        } else {
                                            "{cell.text}"
                                        }
                                    }
                                }
                                if show_actions {
                                    td {
                                        class: "data-table__actions",
                                        if let Some(handler) = on_edit {
                                            button {
                                                class: "link",
                                                onclick: {
                                                    let id = row.id.clone();
                                                    move |_| handler.call(id.clone())
                                                },
                                                "Edit"
                                            }
                                        }
                                        if let Some(handler) = on_delete {
                                            button {
                                                class: "link link--danger",
                                                onclick: {
                                                    let id = row.id.clone();
                                                    move |_| handler.call(id.clone())
                                                },
                                                "Delete"
                                            }
                                        }
                                    }
                                }
                            }
                        }
                        if visible.is_empty() {
                            tr {
                                td {
                                    class: "data-table__empty",
                                    colspan: "{span}",
                                    "No data available"
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(id: &str, title: &str, price: f64) -> Row {
        Row {
            id: id.into(),
            cells: vec![Cell::text(title), Cell::number(format!("${}", price), price)],
        }
    }

    fn ids(rows: &[Row]) -> Vec<&str> {
        rows.iter().map(|r| r.id.as_str()).collect()
    }

    #[test]
    fn test_search_is_case_insensitive_over_all_cells() {
        let rows = vec![row("a", "Robot Vacuum", 250.0), row("b", "Meal Planner", 40.0)];
        assert_eq!(ids(&filter_rows(&rows, "ROBOT")), vec!["a"]);
        assert_eq!(ids(&filter_rows(&rows, "$40")), vec!["b"]);
        // Joined with a space, so a needle can span adjacent cells
        assert_eq!(ids(&filter_rows(&rows, "planner $4")), vec!["b"]);
        assert_eq!(filter_rows(&rows, "").len(), 2);
    }

    #[test]
    fn test_sort_toggle_and_numeric_order() {
        let rows = vec![row("a", "b", 100.0), row("b", "a", 9.0), row("c", "c", 20.0)];

        let by_price = SortState::default().toggle(1);
        assert_eq!(by_price.direction, SortDirection::Asc);
        assert_eq!(ids(&sort_rows(rows.clone(), by_price)), vec!["b", "c", "a"]);

        let flipped = by_price.toggle(1);
        assert_eq!(flipped.direction, SortDirection::Desc);
        assert_eq!(ids(&sort_rows(rows.clone(), flipped)), vec!["a", "c", "b"]);

        // Switching column resets to ascending
        let by_title = flipped.toggle(0);
        assert_eq!(by_title.direction, SortDirection::Asc);
        assert_eq!(ids(&sort_rows(rows.clone(), by_title)), vec!["b", "a", "c"]);

        assert_eq!(ids(&sort_rows(rows, SortState::default())), vec!["a", "b", "c"]);
    }
}
