//! DOM render host: hydrates the server markup once, then remounts on
//! live updates.

use std::any::Any;
use std::cell::RefCell;

use futures::future::LocalBoxFuture;
use leptos::mount::{hydrate_from, mount_to};
use leptos::prelude::*;
use wasm_bindgen::{JsCast, JsValue};

use crate::app::{App, DevToolsRoot};
use crate::error::BootError;
use crate::hydration::{MountRequest, RenderHost};
use crate::state::Store;

/// Global a browser dev-tools extension installs on `window`.
const DEVTOOLS_EXTENSION_GLOBAL: &str = "devToolsExtension";

pub struct WebRenderHost {
    mount_id: String,
    /// Unmount handle of the live application tree.
    current: RefCell<Option<Box<dyn Any>>>,
}

impl WebRenderHost {
    pub fn new(mount_id: impl Into<String>) -> Self {
        Self { mount_id: mount_id.into(), current: RefCell::new(None) }
    }

    fn mount_point(&self) -> Result<web_sys::HtmlElement, BootError> {
        web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id(&self.mount_id))
            .and_then(|el| el.dyn_into::<web_sys::HtmlElement>().ok())
            .ok_or_else(|| BootError::MountPointMissing(self.mount_id.clone()))
    }
}

impl RenderHost for WebRenderHost {
    fn hydrate(&self, request: MountRequest) -> Result<(), BootError> {
        let parent = self.mount_point()?;
        let MountRequest { store, routes, route } = request;
        if let Ok(props) = &route {
            log::debug!("mounting route {} for {}", props.entry.name, props.location);
        }

        let mut current = self.current.borrow_mut();
        let handle: Box<dyn Any> = match current.take() {
            None => Box::new(hydrate_from(parent, move || view! { <App store=store routes=routes/> })),
            Some(previous) => {
                drop(previous);
                Box::new(mount_to(parent, move || view! { <App store=store routes=routes/> }))
            }
        };
        *current = Some(handle);
        Ok(())
    }

    fn has_server_markup(&self, marker: &str) -> bool {
        self.mount_point()
            .ok()
            .and_then(|root| root.first_element_child())
            .is_some_and(|first| first.has_attribute(marker))
    }

    fn devtools_extension_present(&self) -> bool {
        web_sys::window()
            .and_then(|w| js_sys::Reflect::get(&w, &JsValue::from_str(DEVTOOLS_EXTENSION_GLOBAL)).ok())
            .is_some_and(|ext| !ext.is_undefined() && !ext.is_null())
    }

    fn mount_devtools(&self, store: &Store) -> Result<(), BootError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| BootError::Render("no document".to_owned()))?;
        let body = document.body().ok_or_else(|| BootError::Render("no body".to_owned()))?;
        let dest = document
            .create_element("div")
            .map_err(|e| BootError::Render(format!("{e:?}")))?;
        body.append_child(&dest).map_err(|e| BootError::Render(format!("{e:?}")))?;

        let store = store.clone();
        mount_to(dest.unchecked_into(), move || view! { <DevToolsRoot store=store/> }).forget();
        Ok(())
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        leptos::task::spawn_local(task);
    }
}
