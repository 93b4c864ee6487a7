use site_config::NavLink;

pub const MENU_BUTTON_ID: &str = "mobile-menu-btn";
pub const MENU_ID: &str = "mobile-menu";
pub const MENU_CLASS: &str = "fixed top-20 left-0 w-full bg-navy/95 backdrop-blur-lg z-40 p-6 transform -translate-y-full transition-transform duration-300";

pub const SHOWN: &str = "translateY(0px)";
pub const HIDDEN: &str = "translateY(-100%)";

const LINK_CLASS: &str = "block text-white hover:text-teal transition-colors";
const PRIMARY_LINK_CLASS: &str =
    "block bg-teal hover:bg-teal/80 px-4 py-2 rounded-lg transition-colors text-center";

/// Transform to apply on the next click. Anything but the shown state,
/// including the initial empty value, opens the panel.
pub fn next_transform(current: &str) -> &'static str {
    if current == SHOWN {
        HIDDEN
    } else {
        SHOWN
    }
}

pub fn menu_markup(links: &[NavLink]) -> String {
    let mut html = String::from(r#"<div class="space-y-4">"#);
    for link in links {
        let class = if link.primary { PRIMARY_LINK_CLASS } else { LINK_CLASS };
        html.push_str(&format!(
            r#"<a href="{}" class="{}">{}</a>"#,
            escape(&link.href),
            class,
            escape(&link.label)
        ));
    }
    html.push_str("</div>");
    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(target_arch = "wasm32")]
pub use browser::MobileMenu;

#[cfg(target_arch = "wasm32")]
mod browser {
    use site_config::NavLink;
    use wasm_bindgen::JsCast;
    use web_sys::{Document, HtmlElement};

    use super::{menu_markup, next_transform, MENU_BUTTON_ID, MENU_CLASS, MENU_ID};
    use crate::error::FrontendError;
    use crate::listener::EventListener;

    /// Toggle for the small-screen navigation panel; the panel is built lazily
    /// on the first click.
    pub struct MobileMenu {
        document: Document,
        _click: EventListener,
    }

    impl MobileMenu {
        pub fn attach(document: &Document, links: Vec<NavLink>) -> Result<Self, FrontendError> {
            let button = document
                .get_element_by_id(MENU_BUTTON_ID)
                .ok_or(FrontendError::MissingGlobal("mobile menu button"))?;
            let doc = document.clone();
            let click = EventListener::new(&button, "click", move |_| {
                if let Err(err) = toggle(&doc, &links) {
                    log::error!("mobile menu: {err}");
                }
            })?;
            Ok(Self {
                document: document.clone(),
                _click: click,
            })
        }
    }

    impl Drop for MobileMenu {
        fn drop(&mut self) {
            if let Some(menu) = self.document.get_element_by_id(MENU_ID) {
                menu.remove();
            }
        }
    }

    fn toggle(document: &Document, links: &[NavLink]) -> Result<(), FrontendError> {
        let menu = match document.get_element_by_id(MENU_ID) {
            Some(menu) => menu,
            None => {
                let menu = document.create_element("div")?;
                menu.set_id(MENU_ID);
                menu.set_class_name(MENU_CLASS);
                menu.set_inner_html(&menu_markup(links));
                document
                    .body()
                    .ok_or(FrontendError::MissingGlobal("document.body"))?
                    .append_child(&menu)?;
                menu
            }
        };
        let menu = menu
            .dyn_into::<HtmlElement>()
            .map_err(|_| FrontendError::WrongElement {
                selector: format!("#{MENU_ID}"),
                expected: "HTMLElement",
            })?;
        let style = menu.style();
        let current = style.get_property_value("transform")?;
        style.set_property("transform", next_transform(&current))?;
        Ok(())
    }
}
