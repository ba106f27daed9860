//! Application state driving the terminal screens.
//!
//! [`App`] owns the [`Session`] and everything the screens need on top of
//! it: the current route, form buffers, the focused field, the open modal,
//! the latest notification and the action waiting to run asynchronously.

use std::time::Duration;

use chrono::{Local, NaiveDate};
use tracing::debug;

use super::session::Session;
use crate::domain::{
    ApplicationDraft, ApplicationForm, BusinessDraft, BusinessForm, CompanyType, DigitalIdCard,
    DomainError, Purpose,
};
use crate::infrastructure::LocalStore;

/// Screens reachable through the navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// `/`
    Login,
    /// `/application`, requires a signed-in user
    Application,
    /// `/dashboard`, requires a user and an application
    Dashboard,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Route::Login => "/",
            Route::Application => "/application",
            Route::Dashboard => "/dashboard",
        }
    }
}

/// Overlays shown on top of the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    DigitalId,
    BusinessRegistration,
}

/// Every input field across the forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Email,
    Password,
    FullName,
    DateOfBirth,
    PhoneNumber,
    Purpose,
    IdNumber,
    BusinessFullName,
    CompanyId,
    CompanyInvestment,
    CompanyGoal,
    CompanyType,
}

const LOGIN_FIELDS: &[FormField] = &[FormField::Email, FormField::Password];

const APPLICATION_FIELDS: &[FormField] = &[
    FormField::FullName,
    FormField::DateOfBirth,
    FormField::PhoneNumber,
    FormField::Purpose,
    FormField::IdNumber,
];

const BUSINESS_FIELDS: &[FormField] = &[
    FormField::BusinessFullName,
    FormField::CompanyId,
    FormField::CompanyInvestment,
    FormField::CompanyGoal,
    FormField::CompanyType,
];

impl FormField {
    pub fn label(&self) -> &'static str {
        match self {
            FormField::Email => "Email Address",
            FormField::Password => "Password",
            FormField::FullName | FormField::BusinessFullName => "Full Name *",
            FormField::DateOfBirth => "Date of Birth * (YYYY-MM-DD)",
            FormField::PhoneNumber => "Phone Number *",
            FormField::Purpose => "Purpose of Application *",
            FormField::IdNumber => "ID Number *",
            FormField::CompanyId => "Company ID *",
            FormField::CompanyInvestment => "Company Investment (₹) *",
            FormField::CompanyGoal => "Company Goal *",
            FormField::CompanyType => "Company Type *",
        }
    }

    /// Select fields are changed with left/right instead of typing.
    pub fn is_choice(&self) -> bool {
        matches!(self, FormField::Purpose | FormField::CompanyType)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A transient message shown in the status bar until the next key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub description: String,
    pub kind: NotificationKind,
}

impl Notification {
    pub fn success(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            kind: NotificationKind::Success,
        }
    }

    pub fn error(title: &str, description: &str) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            kind: NotificationKind::Error,
        }
    }

    pub fn validation(error: &DomainError) -> Self {
        Self::error("Validation Error", &error.to_string())
    }
}

/// Work queued by a key press and completed by [`App::run_pending`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingAction {
    Login,
    GmailLogin,
    SubmitApplication(ApplicationDraft),
    SubmitBusiness(BusinessDraft),
}

const WELCOME: &str = "Welcome to e-Residency of Bhutan!";

/// State shared by the input handler and the renderer.
#[derive(Debug)]
pub struct App<S: LocalStore> {
    pub session: Session<S>,
    pub route: Route,
    pub modal: Option<Modal>,
    pub login_form: LoginForm,
    pub application_form: ApplicationForm,
    pub business_form: BusinessForm,
    /// Index into the fields of the visible form
    pub focus: usize,
    pub notification: Option<Notification>,
    pub pending: Option<PendingAction>,
    pub should_quit: bool,
    submit_delay: Duration,
}

impl<S: LocalStore> App<S> {
    /// Wraps a rehydrated session and picks the starting screen from it.
    pub fn new(session: Session<S>, submit_delay: Duration) -> Self {
        let route = if session.user().is_none() {
            Route::Login
        } else if session.application().is_none() {
            Route::Application
        } else {
            Route::Dashboard
        };

        Self {
            session,
            route,
            modal: None,
            login_form: LoginForm::default(),
            application_form: ApplicationForm::default(),
            business_form: BusinessForm::default(),
            focus: 0,
            notification: None,
            pending: None,
            should_quit: false,
            submit_delay,
        }
    }

    /// Moves to `route`, redirecting to login when its requirements are unmet.
    pub fn navigate(&mut self, route: Route) {
        let allowed = match route {
            Route::Login => true,
            Route::Application => self.session.user().is_some(),
            Route::Dashboard => {
                self.session.user().is_some() && self.session.application().is_some()
            }
        };
        let target = if allowed { route } else { Route::Login };

        debug!(requested = route.path(), resolved = target.path(), "Navigating");
        self.route = target;
        self.modal = None;
        self.focus = 0;
    }

    /// Fields of whichever form is currently in front.
    pub fn fields(&self) -> &'static [FormField] {
        match (self.route, self.modal) {
            (_, Some(Modal::BusinessRegistration)) => BUSINESS_FIELDS,
            (_, Some(Modal::DigitalId)) | (Route::Dashboard, None) => &[],
            (Route::Login, None) => LOGIN_FIELDS,
            (Route::Application, None) => APPLICATION_FIELDS,
        }
    }

    pub fn focused_field(&self) -> Option<FormField> {
        self.fields().get(self.focus).copied()
    }

    pub fn focus_next(&mut self) {
        let count = self.fields().len();
        if count > 0 {
            self.focus = (self.focus + 1) % count;
        }
    }

    pub fn focus_previous(&mut self) {
        let count = self.fields().len();
        if count > 0 {
            self.focus = (self.focus + count - 1) % count;
        }
    }

    /// Current text of a field, with select fields shown by label.
    pub fn field_value(&self, field: FormField) -> String {
        match field {
            FormField::Email => self.login_form.email.clone(),
            FormField::Password => "*".repeat(self.login_form.password.chars().count()),
            FormField::FullName => self.application_form.full_name.clone(),
            FormField::DateOfBirth => self.application_form.date_of_birth.clone(),
            FormField::PhoneNumber => self.application_form.phone_number.clone(),
            FormField::Purpose => self
                .application_form
                .purpose
                .map_or("Select purpose", |p| p.label())
                .to_string(),
            FormField::IdNumber => self.application_form.id_number.clone(),
            FormField::BusinessFullName => self.business_form.full_name.clone(),
            FormField::CompanyId => self.business_form.company_id.clone(),
            FormField::CompanyInvestment => self.business_form.company_investment.clone(),
            FormField::CompanyGoal => self.business_form.company_goal.clone(),
            FormField::CompanyType => self
                .business_form
                .company_type
                .map_or("Select company type", |t| t.label())
                .to_string(),
        }
    }

    fn text_buffer_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Email => Some(&mut self.login_form.email),
            FormField::Password => Some(&mut self.login_form.password),
            FormField::FullName => Some(&mut self.application_form.full_name),
            FormField::DateOfBirth => Some(&mut self.application_form.date_of_birth),
            FormField::PhoneNumber => Some(&mut self.application_form.phone_number),
            FormField::IdNumber => Some(&mut self.application_form.id_number),
            FormField::BusinessFullName => Some(&mut self.business_form.full_name),
            FormField::CompanyId => Some(&mut self.business_form.company_id),
            FormField::CompanyInvestment => Some(&mut self.business_form.company_investment),
            FormField::CompanyGoal => Some(&mut self.business_form.company_goal),
            FormField::Purpose | FormField::CompanyType => None,
        }
    }

    /// Types a character into the focused text field.
    pub fn input_char(&mut self, c: char) {
        if let Some(buffer) = self.focused_field().and_then(|field| self.text_buffer_mut(field)) {
            buffer.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(buffer) = self.focused_field().and_then(|field| self.text_buffer_mut(field)) {
            buffer.pop();
        }
    }

    /// Steps the focused select field through its options.
    ///
    /// From "nothing selected" the first step lands on the first option
    /// going forward or the last option going backward.
    pub fn cycle_choice(&mut self, forward: bool) {
        match self.focused_field() {
            Some(FormField::Purpose) => {
                self.application_form.purpose =
                    Some(step(&Purpose::ALL, self.application_form.purpose, forward));
            }
            Some(FormField::CompanyType) => {
                self.business_form.company_type =
                    Some(step(&CompanyType::ALL, self.business_form.company_type, forward));
            }
            _ => {}
        }
    }

    /// Submits whichever form is in front.
    ///
    /// Validation failures become notifications. Valid submissions are
    /// queued as a [`PendingAction`].
    pub fn submit(&mut self) {
        if self.pending.is_some() {
            return;
        }

        match (self.route, self.modal) {
            (_, Some(Modal::BusinessRegistration)) => match self.business_form.validate() {
                Ok(draft) => self.pending = Some(PendingAction::SubmitBusiness(draft)),
                Err(e) => self.notification = Some(Notification::validation(&e)),
            },
            (Route::Login, None) => self.pending = Some(PendingAction::Login),
            (Route::Application, None) => match self.application_form.validate(today()) {
                Ok(draft) => self.pending = Some(PendingAction::SubmitApplication(draft)),
                Err(e) => self.notification = Some(Notification::validation(&e)),
            },
            _ => {}
        }
    }

    pub fn request_gmail_login(&mut self) {
        if self.pending.is_none() && self.route == Route::Login {
            self.pending = Some(PendingAction::GmailLogin);
        }
    }

    /// Completes the queued action, if any.
    pub async fn run_pending(&mut self) {
        let Some(action) = self.pending.take() else {
            return;
        };

        match action {
            PendingAction::Login => {
                let email = self.login_form.email.clone();
                let password = self.login_form.password.clone();
                if self.session.login(&email, &password).await {
                    self.notification = Some(Notification::success("Login Successful", WELCOME));
                    self.login_form = LoginForm::default();
                    self.navigate(Route::Application);
                } else {
                    self.notification = Some(Notification::error(
                        "Login Failed",
                        "Please check your credentials and try again.",
                    ));
                }
            }
            PendingAction::GmailLogin => {
                self.session.login_with_gmail().await;
                self.notification = Some(Notification::success("Gmail Login Successful", WELCOME));
                self.login_form = LoginForm::default();
                self.navigate(Route::Application);
            }
            PendingAction::SubmitApplication(draft) => {
                self.simulate_latency().await;
                self.session.submit_application(draft);
                self.application_form = ApplicationForm::default();
                self.notification = Some(Notification::success(
                    "Application Submitted Successfully!",
                    "Your e-Residency application has been approved.",
                ));
                self.navigate(Route::Dashboard);
            }
            PendingAction::SubmitBusiness(draft) => {
                self.simulate_latency().await;
                self.session.submit_business(draft);
                self.business_form = BusinessForm::default();
                self.notification = Some(Notification::success(
                    "Business Registered Successfully!",
                    "Your business has been approved and registered.",
                ));
                self.close_modal();
            }
        }
    }

    /// Label for the submit button while an action is in flight.
    pub fn loading_label(&self) -> Option<&'static str> {
        self.pending.as_ref().map(|action| match action {
            PendingAction::Login | PendingAction::GmailLogin => "Signing In...",
            PendingAction::SubmitApplication(_) => "Processing Application...",
            PendingAction::SubmitBusiness(_) => "Registering...",
        })
    }

    pub fn logout(&mut self) {
        self.session.logout();
        self.login_form = LoginForm::default();
        self.application_form = ApplicationForm::default();
        self.business_form = BusinessForm::default();
        self.navigate(Route::Login);
    }

    pub fn open_digital_id(&mut self) {
        if self.route == Route::Dashboard && self.session.application().is_some() {
            self.modal = Some(Modal::DigitalId);
        }
    }

    /// Opens the registration modal unless a business is already registered.
    pub fn open_business_registration(&mut self) {
        if self.route != Route::Dashboard || self.session.business().is_some() {
            return;
        }
        if let Some(application) = self.session.application() {
            self.business_form = BusinessForm::for_application(application);
            self.modal = Some(Modal::BusinessRegistration);
            self.focus = 0;
        }
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
        self.focus = 0;
    }

    /// The card shown by the digital ID modal.
    pub fn digital_id_card(&self, today: NaiveDate) -> Option<DigitalIdCard> {
        self.session
            .application()
            .map(|application| DigitalIdCard::issue(application, self.session.business(), today))
    }

    async fn simulate_latency(&self) {
        if !self.submit_delay.is_zero() {
            tokio::time::sleep(self.submit_delay).await;
        }
    }
}

fn step<T: Copy + PartialEq>(options: &[T], current: Option<T>, forward: bool) -> T {
    let len = options.len();
    let index = match current.and_then(|value| options.iter().position(|o| *o == value)) {
        Some(i) if forward => (i + 1) % len,
        Some(i) => (i + len - 1) % len,
        None if forward => 0,
        None => len - 1,
    };
    options[index]
}

/// Today's date in the local time zone.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
