use api::models::{Idea, IdeaType};
use dioxus::prelude::*;

use crate::Avatar;

pub(crate) fn type_badge_class(kind: IdeaType) -> &'static str {
    match kind {
        IdeaType::Product => "badge badge--product",
        IdeaType::Service => "badge badge--service",
    }
}

/// Listing summary used in the card grid and on the home page.
#[component]
pub fn IdeaCard(idea: Idea) -> Element {
    let price = idea.formatted_price();
    let created = idea.created_date();
    let creator = idea.creator_name().to_string();

    rsx! {
        div {
            class: "idea-card",
            div {
                class: "idea-card__body",
                div {
                    class: "idea-card__header",
                    h3 { class: "idea-card__title", "{idea.title}" }
                    span { class: type_badge_class(idea.idea_type), "{idea.idea_type}" }
                }
                p { class: "idea-card__category", "{idea.category}" }
                p { class: "idea-card__description", "{idea.problem_description}" }
                div {
                    class: "idea-card__price-row",
                    span { class: "price", "{price}" }
                    if idea.require_nda {
                        span { class: "badge badge--nda", "NDA Required" }
                    }
                }
            }
            div {
                class: "idea-card__footer",
                Link {
                    class: "idea-card__creator",
                    to: "/profile/{idea.creator}",
                    Avatar { url: idea.creator_info.photo_url.clone(), alt: creator.clone(), size: 32 }
                    div {
                        span { class: "idea-card__creator-name", "Created by {creator}" }
                        span { class: "idea-card__date", "{created}" }
                    }
                }
                Link {
                    class: "btn btn--ghost btn--block",
                    to: "/ideas/{idea.id}",
                    "View Details"
                }
            }
        }
    }
}
