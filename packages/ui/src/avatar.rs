use dioxus::prelude::*;

/// Neutral silhouette shown when a user has no photo.
pub const DEFAULT_AVATAR: &str = "data:image/svg+xml;utf8,<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 32 32'><circle cx='16' cy='16' r='16' fill='%23E5E7EB'/><circle cx='16' cy='12' r='5' fill='%239CA3AF'/><path d='M6 26c0-5.523 4.477-10 10-10s10 4.477 10 10' fill='%239CA3AF'/></svg>";

#[component]
pub fn Avatar(
    url: Option<String>,
    #[props(default = "Avatar".to_string())] alt: String,
    #[props(default = 32)] size: u32,
) -> Element {
    let src = url
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_AVATAR.to_string());
    rsx! {
        img {
            class: "avatar",
            src: "{src}",
            alt: "{alt}",
            width: "{size}",
            height: "{size}",
        }
    }
}
