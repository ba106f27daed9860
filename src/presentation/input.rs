use crate::application::{App, Modal, Route};
use crate::infrastructure::LocalStore;
use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers};

pub struct InputHandler;

impl InputHandler {
    /// Dispatches a terminal event. Only key presses are acted on.
    pub fn handle_event<S: LocalStore>(app: &mut App<S>, event: Event) {
        if let Event::Key(key) = event {
            if key.kind == KeyEventKind::Press {
                Self::handle_key_event(app, key.code, key.modifiers);
            }
        }
    }

    pub fn handle_key_event<S: LocalStore>(
        app: &mut App<S>,
        key: KeyCode,
        modifiers: KeyModifiers,
    ) {
        if modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key, KeyCode::Char('c') | KeyCode::Char('q'))
        {
            app.should_quit = true;
            return;
        }

        // Input is ignored while a submission is in flight
        if app.pending.is_some() {
            return;
        }

        app.notification = None;

        match app.modal {
            Some(Modal::DigitalId) => Self::handle_digital_id(app, key),
            Some(Modal::BusinessRegistration) => Self::handle_form(app, key),
            None => match app.route {
                Route::Login => Self::handle_login(app, key, modifiers),
                Route::Application => Self::handle_form(app, key),
                Route::Dashboard => Self::handle_dashboard(app, key),
            },
        }
    }

    fn handle_login<S: LocalStore>(app: &mut App<S>, key: KeyCode, modifiers: KeyModifiers) {
        if modifiers.contains(KeyModifiers::CONTROL) && key == KeyCode::Char('g') {
            app.request_gmail_login();
            return;
        }
        Self::handle_form(app, key);
    }

    fn handle_form<S: LocalStore>(app: &mut App<S>, key: KeyCode) {
        let on_choice = app.focused_field().is_some_and(|field| field.is_choice());

        match key {
            KeyCode::Enter => app.submit(),
            KeyCode::Esc => {
                if app.modal.is_some() {
                    app.close_modal();
                }
            }
            KeyCode::Tab | KeyCode::Down => app.focus_next(),
            KeyCode::BackTab | KeyCode::Up => app.focus_previous(),
            KeyCode::Left if on_choice => app.cycle_choice(false),
            KeyCode::Right if on_choice => app.cycle_choice(true),
            KeyCode::Backspace => app.backspace(),
            KeyCode::Char(c) => app.input_char(c),
            _ => {}
        }
    }

    fn handle_dashboard<S: LocalStore>(app: &mut App<S>, key: KeyCode) {
        match key {
            KeyCode::Char('d') | KeyCode::Char('i') => app.open_digital_id(),
            KeyCode::Char('b') => app.open_business_registration(),
            KeyCode::Char('l') => app.logout(),
            KeyCode::Char('q') => app.should_quit = true,
            _ => {}
        }
    }

    fn handle_digital_id<S: LocalStore>(app: &mut App<S>, key: KeyCode) {
        if matches!(key, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
            app.close_modal();
        }
    }
}
