use api::storage::Upload;
use dioxus::prelude::*;

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Read the first file chosen in a file input.
pub async fn first_upload(evt: FormEvent) -> Option<Upload> {
    let file = evt.files().into_iter().next()?;
    let file_name = file.name();
    match file.read_bytes().await {
        Ok(bytes) => Some(Upload {
            content_type: file
                .content_type()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string()),
            file_name,
            bytes: bytes.to_vec(),
        }),
        Err(e) => {
            tracing::error!(file = %file_name, "could not read selected file: {}", e);
            None
        }
    }
}

/// File input that hands the picked file to `on_pick`.
#[component]
pub fn FilePicker(
    id: String,
    label: String,
    #[props(default = "*/*".to_string())] accept: String,
    #[props(default)] selected: Option<String>,
    on_pick: EventHandler<Upload>,
) -> Element {
    rsx! {
        div {
            class: "form-field",
            label { class: "form-label", r#for: "{id}", "{label}" }
            input {
                id: "{id}",
                class: "form-input",
                r#type: "file",
                accept: "{accept}",
                onchange: move |evt| async move {
                    if let Some(upload) = first_upload(evt).await {
                        on_pick.call(upload);
                    }
                },
            }
            if let Some(name) = selected {
                p { class: "form-hint", "Selected: {name}" }
            }
        }
    }
}
