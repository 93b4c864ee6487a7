use std::rc::Rc;

use contact_form::{
    report_unreadable, submit, FormMethod, FormRequest, FormTransport, InFlight, SubmitOutcome,
    SubmitUi, TransportError, TransportReply,
};
use futures_util::future::LocalBoxFuture;
use gloo_net::http::Request;
use site_config::ContactMessages;
use wasm_bindgen::JsCast;
use web_sys::{Document, FormData, HtmlButtonElement, HtmlFormElement, Window};

use crate::error::FrontendError;
use crate::listener::EventListener;

pub const FORM_ID: &str = "contact-form";
const LOADING_SELECTORS: [&str; 2] = ["#form-loading", ".loading"];

/// Sends form requests with `fetch`, asking for a JSON reply.
pub struct FetchTransport;

impl FetchTransport {
    async fn fetch(request: &FormRequest) -> Result<TransportReply, TransportError> {
        let builder = match request.method {
            FormMethod::Dialog => {
                return Err(TransportError::InvalidRequest("dialog forms are not sent".into()))
            }
            FormMethod::Get => Request::get(&request.action).query(
                request
                    .fields
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            ),
            FormMethod::Post => Request::post(&request.action),
        }
        .header("Accept", "application/json");

        let prepared = match request.method {
            FormMethod::Get | FormMethod::Dialog => builder.build(),
            FormMethod::Post => builder.body(form_data(&request.fields)?),
        }
        .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let response = prepared
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Ok(TransportReply { status, body })
    }
}

impl FormTransport for FetchTransport {
    fn send<'a>(
        &'a self,
        request: &'a FormRequest,
    ) -> LocalBoxFuture<'a, Result<TransportReply, TransportError>> {
        Box::pin(Self::fetch(request))
    }
}

fn form_data(fields: &[(String, String)]) -> Result<FormData, TransportError> {
    let data = FormData::new().map_err(|_| TransportError::InvalidRequest("FormData".into()))?;
    for (name, value) in fields {
        data.append_with_str(name, value)
            .map_err(|_| TransportError::InvalidRequest(format!("field `{name}`")))?;
    }
    Ok(data)
}

/// Snapshot of the form's text fields. File inputs are not carried.
fn read_form(form: &HtmlFormElement) -> Result<FormRequest, FrontendError> {
    let method = FormMethod::parse(&form.method());
    let mut request = FormRequest::new(form.action(), method);
    let data = FormData::new_with_form(form)?;
    if let Some(entries) = js_sys::try_iter(&data)? {
        for entry in entries {
            let entry: js_sys::Array = entry?.unchecked_into();
            if let (Some(name), Some(value)) = (entry.get(0).as_string(), entry.get(1).as_string()) {
                request = request.with_field(name, value);
            }
        }
    }
    Ok(request)
}

struct DomSubmitUi {
    window: Window,
    form: HtmlFormElement,
    messages: ContactMessages,
}

impl DomSubmitUi {
    fn loading_indicator(&self) -> Option<web_sys::Element> {
        LOADING_SELECTORS
            .iter()
            .find_map(|sel| self.form.query_selector(sel).ok().flatten())
    }

    fn submit_button(&self) -> Option<HtmlButtonElement> {
        self.form
            .query_selector(r#"button[type="submit"], button:not([type])"#)
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlButtonElement>().ok())
    }
}

impl SubmitUi for DomSubmitUi {
    fn set_busy(&self, busy: bool) {
        if let Some(indicator) = self.loading_indicator() {
            let _ = indicator.class_list().toggle_with_force("hidden", !busy);
        }
        if let Some(button) = self.submit_button() {
            button.set_disabled(busy);
        }
    }

    fn notify(&self, outcome: &SubmitOutcome) {
        let text = match outcome {
            SubmitOutcome::Sent => self.messages.success.clone(),
            SubmitOutcome::Rejected {
                message: Some(detail),
                ..
            } => format!("{}\n{detail}", self.messages.rejected),
            SubmitOutcome::Rejected { .. } | SubmitOutcome::InvalidRequest(_) => {
                self.messages.rejected.clone()
            }
            SubmitOutcome::NetworkError(_) => self.messages.network_error.clone(),
            // `submit` returns Busy before touching the UI.
            SubmitOutcome::Busy => return,
        };
        let _ = self.window.alert_with_message(&text);
    }

    fn reset_fields(&self) {
        self.form.reset();
    }
}

struct ContactState {
    in_flight: InFlight,
    transport: FetchTransport,
    ui: DomSubmitUi,
}

/// Intercepts `#contact-form` submits and posts them in the background.
pub struct ContactForm {
    _submit: EventListener,
}

impl ContactForm {
    pub fn attach(window: &Window, document: &Document, messages: ContactMessages) -> Result<Self, FrontendError> {
        let form = document
            .get_element_by_id(FORM_ID)
            .ok_or(FrontendError::MissingGlobal("contact form"))?
            .dyn_into::<HtmlFormElement>()
            .map_err(|_| FrontendError::WrongElement {
                selector: format!("#{FORM_ID}"),
                expected: "HTMLFormElement",
            })?;

        let state = Rc::new(ContactState {
            in_flight: InFlight::new(),
            transport: FetchTransport,
            ui: DomSubmitUi {
                window: window.clone(),
                form: form.clone(),
                messages,
            },
        });

        let submit_listener = EventListener::new(&form, "submit", move |event| {
            if !FormMethod::parse(&state.ui.form.method()).is_network() {
                return;
            }
            event.prevent_default();
            let request = match read_form(&state.ui.form) {
                Ok(request) => request,
                Err(err) => {
                    report_unreadable(&state.ui, err.to_string());
                    return;
                }
            };
            let state = state.clone();
            wasm_bindgen_futures::spawn_local(async move {
                submit(&state.in_flight, &state.transport, &state.ui, &request).await;
            });
        })?;

        Ok(Self {
            _submit: submit_listener,
        })
    }
}
