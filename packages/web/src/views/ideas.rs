//! Ideas listing: filters, scope toggles, cards or table, pagination.
//!
//! Every fetch goes through [`run_trigger`]: a filter edit starts a
//! debounced load, anything else loads immediately, and only the newest
//! load may land.

use std::time::Duration;

use api::listing::{
    run_trigger, ListingController, ListingHost, ListingRequest, ListingState, RetryPolicy, Trigger,
};
use api::models::{Idea, IdeaType};
use api::query::{Filters, Scope, ALL, ALL_CATEGORIES, ALL_TYPES};
use api::timer::sleep;
use api::CatalogApi;
use dioxus::prelude::*;
use ui::data_table::{Cell, Column, Row};
use ui::icons::{FaFilter, FaList, FaTableCellsLarge, FaXmark};
use ui::{
    category_names, id_token, use_auth, use_backend, use_categories, ApiErrorDisplay, DataTable,
    Icon, IdeaCard, LoadingSkeleton, LoadingSpinner, PaginationControls, SpinnerSize,
};

use crate::Route;

/// The page's controller signal, seen by the listing loader.
struct ControllerSignal(Signal<ListingController>);

impl ListingHost for ControllerSignal {
    fn peek<R>(&self, f: impl FnOnce(&ListingController) -> R) -> R {
        f(&self.0.peek())
    }

    fn update<R>(&self, f: impl FnOnce(&mut ListingController) -> R) -> R {
        let mut signal = self.0;
        let mut controller = signal.write();
        f(&mut controller)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ViewMode {
    Cards,
    Table,
}

const COLUMNS: [Column; 7] = [
    Column::new("title", "Title"),
    Column::new("creator", "Creator"),
    Column::new("category", "Category"),
    Column::new("type", "Type"),
    Column::new("price", "Price"),
    Column::new("nda", "NDA"),
    Column::new("created", "Created"),
];

fn idea_rows(ideas: &[Idea]) -> Vec<Row> {
    ideas
        .iter()
        .map(|idea| Row {
            id: idea.id.clone(),
            cells: vec![
                Cell::text(idea.title.clone()).link(format!("/ideas/{}", idea.id)),
                Cell::text(idea.creator_name()).link(format!("/profile/{}", idea.creator)),
                Cell::text(idea.category.clone()),
                Cell::text(idea.idea_type.to_string()),
                Cell::number(idea.formatted_price(), idea.desired_price),
                Cell::text(if idea.require_nda { "Required" } else { "Not Required" }),
                Cell::number(
                    idea.created_date(),
                    idea.created().map(|d| d.timestamp() as f64).unwrap_or_default(),
                ),
            ],
        })
        .collect()
}

fn toggle_class(active: bool) -> &'static str {
    if active {
        "btn btn--primary"
    } else {
        "btn btn--secondary"
    }
}

fn view_class(active: bool) -> &'static str {
    if active {
        "view-toggle__btn view-toggle__btn--active"
    } else {
        "view-toggle__btn"
    }
}

fn heading(scope: &Scope, creator_name: Option<&str>) -> String {
    match scope {
        Scope::Mine => "Browse My Ideas".to_string(),
        Scope::Creator(_) => format!("Browse {}'s Ideas", creator_name.unwrap_or("Unknown User")),
        Scope::All => "Browse Ideas".to_string(),
    }
}

#[component]
pub fn Ideas(filter: String, creator: String) -> Element {
    let backend = use_backend();
    let auth = use_auth();
    let nav = use_navigator();
    let categories = use_categories();

    let controller = use_signal(ListingController::new);
    let default_size = backend.config.listing.default_page_size;
    let mut request = use_signal(|| ListingRequest {
        page_size: default_size,
        ..ListingRequest::default()
    });
    let mut view_mode = use_signal(|| ViewMode::Cards);
    let mut show_filters = use_signal(|| false);

    let load_backend = backend.clone();
    let load = use_callback(move |trigger: Trigger| {
        if trigger.resets_page() {
            request.write().page = 1;
        }
        let req = request.peek().clone();
        let backend = load_backend.clone();

        spawn(async move {
            let window = Duration::from_millis(backend.config.listing.debounce_millis);
            let token_backend = backend.clone();
            let outcome = run_trigger(
                &ControllerSignal(controller),
                &backend.catalog,
                trigger,
                req,
                window,
                move || async move { id_token(auth, &token_backend).await },
                &RetryPolicy::default(),
                sleep,
            )
            .await;
            tracing::debug!(?trigger, ?outcome, "listing trigger finished");
        });
    });

    // URL parameters drive the scope; the first run is the initial load
    use_effect(use_reactive!(|(filter, creator)| {
        let scope = Scope::from_params(&filter, &creator);
        let changed = request.peek().scope != scope;
        if changed {
            request.write().scope = scope;
        }
        let first = matches!(controller.peek().state(), ListingState::Idle);
        if first {
            load.call(Trigger::Mount);
        } else if changed {
            load.call(Trigger::ScopeChanged);
        }
    }));

    let name_backend = backend.clone();
    let creator_name = use_resource(move || {
        let backend = name_backend.clone();
        let creator = request.read().scope.creator().map(str::to_string);
        async move {
            let id = creator?;
            match backend.catalog.public_profile(&id).await {
                Ok(profile) if !profile.display_name.is_empty() => Some(profile.display_name),
                Ok(_) => None,
                Err(e) => {
                    tracing::warn!(creator = %id, "could not fetch creator name: {}", e);
                    None
                }
            }
        }
    });

    let mut set_filter = move |edit: fn(&mut Filters, String), value: String| {
        edit(&mut request.write().filters, value);
        load.call(Trigger::FiltersChanged);
    };

    let req = request();
    let state = controller.read();
    let loading = state.is_loading();
    let error = state.error().cloned();
    let ideas = state.ideas().to_vec();
    let pagination = state.pagination();
    drop(state);

    let signed_in = auth().user.is_some();
    let creator_label = creator_name.read().clone().flatten();
    let title = heading(&req.scope, creator_label.as_deref());
    let mut category_options = vec![ALL_CATEGORIES.to_string()];
    category_options.extend(category_names(&categories));

    if let Some(error) = error {
        return rsx! {
            ApiErrorDisplay {
                error: error,
                item_name: "ideas",
                back_url: "/",
                on_retry: move |_| load.call(Trigger::Retry),
            }
        };
    }

    rsx! {
        div {
            class: "ideas-page",
            div {
                class: "ideas-page__header",
                div {
                    h1 { class: "page-title", "{title}" }
                    p {
                        class: "page-subtitle",
                        "{ideas.len()} of {pagination.total_count} ideas"
                        if pagination.total_pages > 1 {
                            span { " (Page {pagination.current_page} of {pagination.total_pages})" }
                        }
                    }
                }
                div {
                    class: "ideas-page__toolbar",
                    if req.scope.creator().is_some() {
                        button {
                            class: "btn btn--secondary",
                            onclick: move |_| {
                                nav.push(Route::Ideas { filter: String::new(), creator: String::new() });
                            },
                            "← Back to All Ideas"
                        }
                    } else if signed_in {
                        button {
                            class: toggle_class(req.scope.is_mine()),
                            onclick: move |_| {
                                let showing_mine = request.peek().scope.is_mine();
                                let (filter, creator) = if showing_mine {
                                    Scope::All.to_params()
                                } else {
                                    Scope::Mine.to_params()
                                };
                                nav.push(Route::Ideas { filter, creator });
                            },
                            if req.scope.is_mine() { "Show All Ideas" } else { "Show My Ideas" }
                        }
                    }
                    div {
                        class: "view-toggle",
                        button {
                            class: view_class(view_mode() == ViewMode::Cards),
                            title: "Card View",
                            onclick: move |_| view_mode.set(ViewMode::Cards),
                            Icon { icon: FaTableCellsLarge, width: 16, height: 16 }
                        }
                        button {
                            class: view_class(view_mode() == ViewMode::Table),
                            title: "Table View",
                            onclick: move |_| view_mode.set(ViewMode::Table),
                            Icon { icon: FaList, width: 16, height: 16 }
                        }
                    }
                    button {
                        class: toggle_class(show_filters()),
                        onclick: move |_| show_filters.toggle(),
                        Icon { icon: FaFilter, width: 14, height: 14 }
                        span { "Filters" }
                    }
                }
            }

            if show_filters() {
                div {
                    class: "filters",
                    div {
                        class: "filters__header",
                        h3 { "Filters" }
                        div {
                            button {
                                class: "link",
                                onclick: move |_| {
                                    request.write().filters = Filters::cleared();
                                    load.call(Trigger::FiltersChanged);
                                },
                                "Clear All"
                            }
                            button {
                                class: "link",
                                aria_label: "Close filters",
                                onclick: move |_| show_filters.set(false),
                                Icon { icon: FaXmark, width: 16, height: 16 }
                            }
                        }
                    }
                    div {
                        class: "filters__grid",
                        div {
                            class: "form-field",
                            label { class: "form-label", "Search" }
                            input {
                                class: "form-input",
                                placeholder: "Search ideas...",
                                value: "{req.filters.search}",
                                oninput: move |e| set_filter(|f, v| f.search = v, e.value()),
                            }
                        }
                        div {
                            class: "form-field",
                            label { class: "form-label", "Category" }
                            select {
                                class: "form-input",
                                onchange: move |e| set_filter(|f, v| f.category = v, e.value()),
                                for name in category_options {
                                    option {
                                        key: "{name}",
                                        value: "{name}",
                                        selected: req.filters.category == name,
                                        "{name}"
                                    }
                                }
                            }
                        }
                        div {
                            class: "form-field",
                            label { class: "form-label", "Type" }
                            select {
                                class: "form-input",
                                onchange: move |e| set_filter(|f, v| f.idea_type = v, e.value()),
                                option { value: ALL_TYPES, selected: req.filters.idea_type == ALL_TYPES, "{ALL_TYPES}" }
                                for kind in IdeaType::ALL {
                                    option {
                                        key: "{kind}",
                                        value: "{kind}",
                                        selected: req.filters.idea_type == kind.as_str(),
                                        "{kind}"
                                    }
                                }
                            }
                        }
                        div {
                            class: "form-field",
                            label { class: "form-label", "Min Price" }
                            input {
                                class: "form-input",
                                r#type: "number",
                                placeholder: "0",
                                value: "{req.filters.price_min}",
                                oninput: move |e| set_filter(|f, v| f.price_min = v, e.value()),
                            }
                        }
                        div {
                            class: "form-field",
                            label { class: "form-label", "Max Price" }
                            input {
                                class: "form-input",
                                r#type: "number",
                                placeholder: "No limit",
                                value: "{req.filters.price_max}",
                                oninput: move |e| set_filter(|f, v| f.price_max = v, e.value()),
                            }
                        }
                        div {
                            class: "form-field",
                            label { class: "form-label", "NDA Required" }
                            select {
                                class: "form-input",
                                onchange: move |e| set_filter(|f, v| f.require_nda = v, e.value()),
                                for choice in [ALL, "Yes", "No"] {
                                    option {
                                        key: "{choice}",
                                        value: "{choice}",
                                        selected: req.filters.require_nda == choice,
                                        "{choice}"
                                    }
                                }
                            }
                        }
                    }
                }
            }

            if loading {
                if view_mode() == ViewMode::Cards {
                    div {
                        class: "ideas-grid",
                        for i in 0..req.page_size.min(12) {
                            LoadingSkeleton { key: "{i}" }
                        }
                    }
                } else {
                    LoadingSpinner { size: SpinnerSize::Large, text: "Loading ideas...".to_string() }
                }
            } else if ideas.is_empty() {
                div {
                    class: "empty-state",
                    h3 { "No ideas found" }
                    p { "Try adjusting your filters or check back later." }
                }
            } else if view_mode() == ViewMode::Cards {
                div {
                    class: "ideas-grid",
                    for idea in ideas.iter().cloned() {
                        IdeaCard { key: "{idea.id}", idea: idea }
                    }
                }
            } else {
                DataTable { columns: COLUMNS.to_vec(), rows: idea_rows(&ideas) }
            }

            PaginationControls {
                pagination: pagination,
                page_size: req.page_size,
                on_page: move |page| {
                    request.write().page = page;
                    load.call(Trigger::PageChanged);
                },
                on_page_size: move |size| {
                    request.write().page_size = size;
                    load.call(Trigger::FiltersChanged);
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idea(id: &str, price: f64, nda: bool) -> Idea {
        Idea {
            id: id.into(),
            title: format!("Idea {}", id),
            category: "Technology".into(),
            desired_price: price,
            require_nda: nda,
            creator: "u1".into(),
            created_at: "2024-03-01T10:00:00Z".into(),
            ..Idea::default()
        }
    }

    #[test]
    fn test_table_rows_link_and_sort_by_value() {
        let rows = idea_rows(&[idea("a", 1500.0, true), idea("b", 20.0, false)]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].cells.len(), COLUMNS.len());
        assert_eq!(rows[0].cells[0].href.as_deref(), Some("/ideas/a"));
        assert_eq!(rows[0].cells[1].href.as_deref(), Some("/profile/u1"));
        assert_eq!(rows[0].cells[4].text, "$1,500");
        assert_eq!(rows[0].cells[5].text, "Required");
        assert_eq!(rows[1].cells[5].text, "Not Required");
    }

    #[test]
    fn test_heading_per_scope() {
        assert_eq!(heading(&Scope::All, None), "Browse Ideas");
        assert_eq!(heading(&Scope::Mine, None), "Browse My Ideas");
        assert_eq!(
            heading(&Scope::Creator("u1".into()), Some("Ada")),
            "Browse Ada's Ideas"
        );
        assert_eq!(
            heading(&Scope::Creator("u1".into()), None),
            "Browse Unknown User's Ideas"
        );
    }
}
