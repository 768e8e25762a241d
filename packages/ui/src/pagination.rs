use api::listing::PAGE_SIZES;
use api::models::Pagination;
use dioxus::prelude::*;

use crate::icons::{FaChevronLeft, FaChevronRight};
use crate::Icon;

/// Page-size selector plus previous/next controls.
#[component]
pub fn PaginationControls(
    pagination: Pagination,
    page_size: u32,
    on_page: EventHandler<u32>,
    on_page_size: EventHandler<u32>,
) -> Element {
    let current = pagination.current_page;
    let total_pages = pagination.total_pages.max(1);

    rsx! {
        div {
            class: "pagination",
            div {
                class: "pagination__size",
                span { "Show:" }
                select {
                    class: "form-input form-input--sm",
                    onchange: move |e| {
                        if let Ok(size) = e.value().parse::<u32>() {
                            on_page_size.call(size);
                        }
                    },
                    for size in PAGE_SIZES {
                        option { key: "{size}", value: "{size}", selected: size == page_size, "{size}" }
                    }
                }
                span { "per page" }
            }
            div {
                class: "pagination__pages",
                button {
                    class: "btn btn--secondary",
                    disabled: pagination.prev_disabled(),
                    onclick: move |_| on_page.call(current.saturating_sub(1).max(1)),
                    Icon { icon: FaChevronLeft, width: 12, height: 12 }
                    span { "Previous" }
                }
                span {
                    class: "pagination__status",
                    "Page {current} of {total_pages}"
                }
                button {
                    class: "btn btn--secondary",
                    disabled: pagination.next_disabled(),
                    onclick: move |_| on_page.call(current + 1),
                    span { "Next" }
                    Icon { icon: FaChevronRight, width: 12, height: 12 }
                }
            }
            span {
                class: "pagination__total",
                "{pagination.total_count} ideas"
            }
        }
    }
}
