use serde::{Deserialize, Serialize};
use std::cell::Cell;

use futures_util::future::LocalBoxFuture;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FormMethod {
    Get,
    #[default]
    Post,
    /// Closes the enclosing `<dialog>`; never reaches the network.
    Dialog,
}

impl FormMethod {
    /// Browser `form.method` semantics: `get` and `dialog` are recognised,
    /// anything else submits as POST.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("get") {
            FormMethod::Get
        } else if raw.eq_ignore_ascii_case("dialog") {
            FormMethod::Dialog
        } else {
            FormMethod::Post
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FormMethod::Get => "GET",
            FormMethod::Post => "POST",
            FormMethod::Dialog => "DIALOG",
        }
    }

    /// Whether a submit with this method goes over the network and so should be intercepted.
    pub fn is_network(&self) -> bool {
        !matches!(self, FormMethod::Dialog)
    }
}

/// A serialized form ready to go to its declared action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormRequest {
    pub action: String,
    pub method: FormMethod,
    pub fields: Vec<(String, String)>,
}

impl FormRequest {
    pub fn new(action: impl Into<String>, method: FormMethod) -> Self {
        Self {
            action: action.into(),
            method,
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// What came back from the endpoint, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportReply {
    pub status: u16,
    pub body: String,
}

impl TransportReply {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The request never produced a response.
    #[error("network unreachable: {0}")]
    Network(String),
    #[error("request could not be built: {0}")]
    InvalidRequest(String),
}

/// Sends a form to its endpoint; the browser uses `fetch`, tests use fakes.
pub trait FormTransport {
    fn send<'a>(
        &'a self,
        request: &'a FormRequest,
    ) -> LocalBoxFuture<'a, Result<TransportReply, TransportError>>;
}

/// Result of one submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Sent,
    Rejected { status: u16, message: Option<String> },
    NetworkError(String),
    /// The form could not be turned into a request; nothing was sent.
    InvalidRequest(String),
    /// Another submission was still in flight; nothing was sent.
    Busy,
}

impl SubmitOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, SubmitOutcome::Sent)
    }
}

/// UI side effects of a submission.
pub trait SubmitUi {
    fn set_busy(&self, busy: bool);
    fn notify(&self, outcome: &SubmitOutcome);
    fn reset_fields(&self);
}

#[derive(Deserialize)]
struct EndpointReply {
    #[serde(default)]
    errors: Vec<EndpointError>,
}

#[derive(Deserialize)]
struct EndpointError {
    message: String,
}

/// Joins the `errors[].message` entries of a JSON rejection body, if any.
pub fn rejection_message(body: &str) -> Option<String> {
    let reply: EndpointReply = serde_json::from_str(body).ok()?;
    let messages: Vec<String> = reply.errors.into_iter().map(|e| e.message).collect();
    if messages.is_empty() {
        None
    } else {
        Some(messages.join(", "))
    }
}

pub fn classify(result: Result<TransportReply, TransportError>) -> SubmitOutcome {
    match result {
        Ok(reply) if reply.ok() => SubmitOutcome::Sent,
        Ok(reply) => SubmitOutcome::Rejected {
            status: reply.status,
            message: rejection_message(&reply.body),
        },
        Err(TransportError::Network(err)) => SubmitOutcome::NetworkError(err),
        Err(TransportError::InvalidRequest(err)) => SubmitOutcome::InvalidRequest(err),
    }
}

/// Single-slot in-flight marker shared by one form's submit handler.
#[derive(Debug, Default)]
pub struct InFlight {
    active: Cell<bool>,
}

impl InFlight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    pub fn try_begin(&self) -> Option<InFlightToken<'_>> {
        if self.active.replace(true) {
            return None;
        }
        Some(InFlightToken { slot: self })
    }
}

pub struct InFlightToken<'a> {
    slot: &'a InFlight,
}

impl Drop for InFlightToken<'_> {
    fn drop(&mut self) {
        self.slot.active.set(false);
    }
}

struct BusyGuard<'a, U: SubmitUi + ?Sized> {
    ui: &'a U,
}

impl<'a, U: SubmitUi + ?Sized> BusyGuard<'a, U> {
    fn enter(ui: &'a U) -> Self {
        ui.set_busy(true);
        Self { ui }
    }
}

impl<U: SubmitUi + ?Sized> Drop for BusyGuard<'_, U> {
    fn drop(&mut self) {
        self.ui.set_busy(false);
    }
}

/// Runs one submission: busy on, send, notify, reset on success, busy off.
///
/// Busy is cleared on every exit path, including a panic inside the transport.
pub async fn submit<T, U>(
    in_flight: &InFlight,
    transport: &T,
    ui: &U,
    request: &FormRequest,
) -> SubmitOutcome
where
    T: FormTransport + ?Sized,
    U: SubmitUi + ?Sized,
{
    let Some(_token) = in_flight.try_begin() else {
        log::debug!("submit to {} ignored, previous request in flight", request.action);
        return SubmitOutcome::Busy;
    };
    let _busy = BusyGuard::enter(ui);

    let outcome = classify(transport.send(request).await);
    match &outcome {
        SubmitOutcome::Sent => log::info!("form sent to {}", request.action),
        SubmitOutcome::Rejected { status, message } => {
            log::warn!("form rejected with status {status}: {message:?}")
        }
        SubmitOutcome::NetworkError(err) => log::warn!("form not sent: {err}"),
        SubmitOutcome::InvalidRequest(err) => log::warn!("form request invalid: {err}"),
        SubmitOutcome::Busy => {}
    }

    ui.notify(&outcome);
    if outcome.is_sent() {
        ui.reset_fields();
    }
    outcome
}

/// The form could not be read at all; tell the user instead of failing silently.
pub fn report_unreadable<U: SubmitUi + ?Sized>(ui: &U, reason: impl Into<String>) -> SubmitOutcome {
    let outcome = SubmitOutcome::InvalidRequest(reason.into());
    log::error!("contact form unreadable: {outcome:?}");
    ui.notify(&outcome);
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures_util::FutureExt;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Clone, PartialEq)]
    enum Step {
        Busy(bool),
        Send(String),
        Notify(SubmitOutcome),
        Reset,
    }

    type Log = Rc<RefCell<Vec<Step>>>;

    struct FakeUi {
        log: Log,
        fields: RefCell<Vec<String>>,
    }

    impl SubmitUi for FakeUi {
        fn set_busy(&self, busy: bool) {
            self.log.borrow_mut().push(Step::Busy(busy));
        }
        fn notify(&self, outcome: &SubmitOutcome) {
            self.log.borrow_mut().push(Step::Notify(outcome.clone()));
        }
        fn reset_fields(&self) {
            self.fields.borrow_mut().clear();
            self.log.borrow_mut().push(Step::Reset);
        }
    }

    enum Reply {
        Status(u16, &'static str),
        Unreachable,
        BadAction,
        Panic,
    }

    struct FakeEndpoint {
        log: Log,
        reply: Reply,
    }

    impl FormTransport for FakeEndpoint {
        fn send<'a>(
            &'a self,
            request: &'a FormRequest,
        ) -> LocalBoxFuture<'a, Result<TransportReply, TransportError>> {
            async move {
                self.log
                    .borrow_mut()
                    .push(Step::Send(request.field("email").unwrap_or_default().to_string()));
                match self.reply {
                    Reply::Status(status, body) => Ok(TransportReply {
                        status,
                        body: body.to_string(),
                    }),
                    Reply::Unreachable => Err(TransportError::Network("offline".into())),
                    Reply::BadAction => Err(TransportError::InvalidRequest("bad url".into())),
                    Reply::Panic => panic!("transport blew up"),
                }
            }
            .boxed_local()
        }
    }

    fn fixture(reply: Reply) -> (Log, FakeUi, FakeEndpoint, FormRequest) {
        let log: Log = Rc::new(RefCell::new(Vec::new()));
        let ui = FakeUi {
            log: log.clone(),
            fields: RefCell::new(vec!["a@b.c".into(), "hello".into()]),
        };
        let endpoint = FakeEndpoint {
            log: log.clone(),
            reply,
        };
        let request = FormRequest::new("https://forms.example/f/abc", FormMethod::Post)
            .with_field("email", "a@b.c")
            .with_field("message", "hello");
        (log, ui, endpoint, request)
    }

    #[test]
    fn success_notifies_and_clears_fields() {
        let (log, ui, endpoint, request) = fixture(Reply::Status(200, r#"{"ok":true}"#));
        let outcome = block_on(submit(&InFlight::new(), &endpoint, &ui, &request));
        assert_eq!(outcome, SubmitOutcome::Sent);
        assert_eq!(
            *log.borrow(),
            vec![
                Step::Busy(true),
                Step::Send("a@b.c".into()),
                Step::Notify(SubmitOutcome::Sent),
                Step::Reset,
                Step::Busy(false),
            ]
        );
        assert!(ui.fields.borrow().is_empty());
    }

    #[test]
    fn rejection_keeps_fields_and_surfaces_message() {
        let body = r#"{"errors":[{"message":"email is invalid"}]}"#;
        let (log, ui, endpoint, request) = fixture(Reply::Status(422, body));
        let outcome = block_on(submit(&InFlight::new(), &endpoint, &ui, &request));
        assert_eq!(
            outcome,
            SubmitOutcome::Rejected {
                status: 422,
                message: Some("email is invalid".into()),
            }
        );
        assert!(!log.borrow().contains(&Step::Reset));
        assert_eq!(log.borrow().last(), Some(&Step::Busy(false)));
        assert_eq!(ui.fields.borrow().len(), 2);
    }

    #[test]
    fn network_failure_is_distinct_from_rejection() {
        let (log, ui, endpoint, request) = fixture(Reply::Unreachable);
        let outcome = block_on(submit(&InFlight::new(), &endpoint, &ui, &request));
        assert!(matches!(outcome, SubmitOutcome::NetworkError(ref e) if e.contains("offline")));
        assert_eq!(ui.fields.borrow().len(), 2);
        assert_eq!(log.borrow().first(), Some(&Step::Busy(true)));
        assert_eq!(log.borrow().last(), Some(&Step::Busy(false)));
    }

    #[test]
    fn unbuildable_request_is_not_reported_as_network_failure() {
        let (log, ui, endpoint, request) = fixture(Reply::BadAction);
        let outcome = block_on(submit(&InFlight::new(), &endpoint, &ui, &request));
        assert_eq!(outcome, SubmitOutcome::InvalidRequest("bad url".into()));
        assert!(log
            .borrow()
            .contains(&Step::Notify(SubmitOutcome::InvalidRequest("bad url".into()))));
        assert_eq!(ui.fields.borrow().len(), 2);
        assert_eq!(log.borrow().last(), Some(&Step::Busy(false)));
    }

    #[test]
    fn unreadable_form_still_notifies() {
        let (log, ui, _endpoint, _request) = fixture(Reply::Status(200, ""));
        let outcome = report_unreadable(&ui, "FormData");
        assert_eq!(outcome, SubmitOutcome::InvalidRequest("FormData".into()));
        assert_eq!(*log.borrow(), vec![Step::Notify(outcome)]);
        assert_eq!(ui.fields.borrow().len(), 2);
    }

    #[test]
    fn second_submit_while_in_flight_is_ignored() {
        let (log, ui, endpoint, request) = fixture(Reply::Status(200, ""));
        let in_flight = InFlight::new();
        let token = in_flight.try_begin().unwrap();
        let outcome = block_on(submit(&in_flight, &endpoint, &ui, &request));
        assert_eq!(outcome, SubmitOutcome::Busy);
        assert!(log.borrow().is_empty());

        drop(token);
        assert!(!in_flight.is_active());
        let outcome = block_on(submit(&in_flight, &endpoint, &ui, &request));
        assert_eq!(outcome, SubmitOutcome::Sent);
        assert!(!in_flight.is_active());
    }

    #[test]
    fn busy_is_cleared_when_transport_panics() {
        let (log, ui, endpoint, request) = fixture(Reply::Panic);
        let in_flight = InFlight::new();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            block_on(submit(&in_flight, &endpoint, &ui, &request))
        }));
        assert!(result.is_err());
        assert_eq!(log.borrow().last(), Some(&Step::Busy(false)));
        assert!(!in_flight.is_active());
    }

    #[test]
    fn rejection_body_without_errors_has_no_message() {
        assert_eq!(rejection_message(r#"{"errors":[]}"#), None);
        assert_eq!(rejection_message("<html>502</html>"), None);
        assert_eq!(
            rejection_message(r#"{"errors":[{"message":"a"},{"message":"b"}]}"#),
            Some("a, b".into())
        );
    }

    #[test]
    fn method_parsing_defaults_to_post() {
        assert_eq!(FormMethod::parse("GET"), FormMethod::Get);
        assert_eq!(FormMethod::parse(" get "), FormMethod::Get);
        assert_eq!(FormMethod::parse("post"), FormMethod::Post);
        assert_eq!(FormMethod::parse(""), FormMethod::Post);
        assert_eq!(FormMethod::parse("put"), FormMethod::Post);
    }

    #[test]
    fn dialog_forms_are_left_to_the_browser() {
        assert_eq!(FormMethod::parse("dialog"), FormMethod::Dialog);
        assert_eq!(FormMethod::parse(" DIALOG"), FormMethod::Dialog);
        assert!(!FormMethod::Dialog.is_network());
        assert!(FormMethod::Get.is_network());
        assert!(FormMethod::Post.is_network());
    }
}
