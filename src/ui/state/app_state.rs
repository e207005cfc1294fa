use dioxus::prelude::{use_signal, Signal};

use crate::config::AppConfig;
use crate::domain::entities::product::Product;
use crate::usecase::services::view_service::{DataView, ViewState};

#[derive(Clone, Copy)]
pub struct AppState {
    pub data: Signal<DataView<Product>>,
    pub view: Signal<ViewState<Product>>,
    pub busy: Signal<bool>,
    pub status: Signal<String>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        let items_per_page = config.items_per_page;
        let search_fields = config.search_fields.clone();
        Self {
            data: use_signal(DataView::<Product>::new),
            view: use_signal(move || {
                let fields: Vec<&str> = search_fields.iter().map(String::as_str).collect();
                ViewState::new(items_per_page, &fields)
            }),
            busy: use_signal(|| false),
            status: use_signal(|| "Ready".to_string()),
        }
    }
}
