use crate::application::{today, App, FormField, Modal, NotificationKind, Route};
use crate::infrastructure::LocalStore;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const SAFFRON: Color = Color::Rgb(244, 164, 54);
const FOREST: Color = Color::Rgb(46, 125, 50);

pub fn render_ui<S: LocalStore>(f: &mut Frame, app: &App<S>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(f.area());

    render_header(f, app, chunks[0]);
    match app.route {
        Route::Login => render_login(f, app, chunks[1]),
        Route::Application => render_application_form(f, app, chunks[1]),
        Route::Dashboard => render_dashboard(f, app, chunks[1]),
    }
    render_status_bar(f, app, chunks[2]);

    match app.modal {
        Some(Modal::DigitalId) => render_digital_id(f, app),
        Some(Modal::BusinessRegistration) => render_business_registration(f, app),
        None => {}
    }
}

fn render_header<S: LocalStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let who = app
        .session
        .user()
        .map(|user| format!("{} <{}>", user.name, user.email))
        .unwrap_or_else(|| "signed out".to_string());
    let header = Paragraph::new(format!("e-Residency of Bhutan | {} | {}", app.route.path(), who))
        .style(Style::default().fg(SAFFRON));
    f.render_widget(header, area);
}

fn form_lines<S: LocalStore>(app: &App<S>, fields: &[FormField]) -> Vec<Line<'static>> {
    let focused = app.focused_field();
    let mut lines = Vec::new();

    for field in fields {
        let is_focused = focused == Some(*field);
        let label_style = if is_focused {
            Style::default().fg(SAFFRON).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Gray)
        };
        let value = app.field_value(*field);
        let value = if is_focused && field.is_choice() {
            format!("< {value} >")
        } else if is_focused {
            format!("{value}_")
        } else {
            value
        };

        lines.push(Line::from(Span::styled(field.label(), label_style)));
        lines.push(Line::from(format!("  {value}")));
        lines.push(Line::from(""));
    }

    lines
}

fn button_line(label: &str) -> Line<'static> {
    Line::from(Span::styled(
        format!("[ {label} ]"),
        Style::default().fg(Color::Black).bg(SAFFRON).add_modifier(Modifier::BOLD),
    ))
}

fn render_login<S: LocalStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let mut lines = vec![
        Line::from(Span::styled(
            "Gateway to the Kingdom of Happiness",
            Style::default().fg(Color::Gray),
        )),
        Line::from(""),
    ];
    lines.extend(form_lines(app, app.fields()));
    lines.push(button_line(app.loading_label().unwrap_or("Sign In")));
    lines.push(Line::from(""));
    lines.push(Line::from("Or continue with: Ctrl+G  Login with Gmail"));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "By signing in, you agree to our Terms of Service and Privacy Policy",
        Style::default().fg(Color::DarkGray),
    )));

    let login = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("Welcome Back"))
        .wrap(Wrap { trim: false });
    f.render_widget(login, centered(area, 60, 90));
}

fn render_application_form<S: LocalStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let name = app.session.user().map(|user| user.name.as_str()).unwrap_or_default();
    let mut lines = vec![
        Line::from(format!("Welcome {name}, please complete your application form")),
        Line::from(""),
    ];
    lines.extend(form_lines(app, app.fields()));
    lines.push(button_line(app.loading_label().unwrap_or("Submit Application")));

    let form = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("e-Residency Application"))
        .wrap(Wrap { trim: false });
    f.render_widget(form, centered(area, 70, 100));
}

fn render_dashboard<S: LocalStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let Some(application) = app.session.application() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Min(0)])
        .split(area);

    let status = Paragraph::new(vec![
        Line::from(format!("Welcome, {}", application.full_name)),
        Line::from(vec![
            Span::styled(
                format!("✅ {}", application.status.label()),
                Style::default().fg(FOREST).add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!("   Application ID: {}", application.id_number)),
        ]),
        Line::from(""),
        Line::from("d: View Digital ID"),
    ])
    .block(Block::default().borders(Borders::ALL).title("Application Status"));
    f.render_widget(status, chunks[0]);

    let mut lines = vec![Line::from("Register your business in Bhutan"), Line::from("")];
    match app.session.business() {
        Some(business) => {
            lines.push(Line::from(Span::styled(
                "✅ Business Registered",
                Style::default().fg(FOREST).add_modifier(Modifier::BOLD),
            )));
            lines.push(Line::from(""));
            lines.push(Line::from(format!("Company ID: {}", business.company_id)));
            lines.push(Line::from(format!("Type: {}", business.company_type.label())));
            lines.push(Line::from(format!("Investment: ₹{}", business.company_investment)));
            lines.push(Line::from(vec![
                Span::raw("Status: "),
                Span::styled("Active", Style::default().fg(FOREST)),
            ]));
        }
        None => lines.push(Line::from("b: Register Business")),
    }

    let business = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("e-Business Registration"))
        .wrap(Wrap { trim: false });
    f.render_widget(business, chunks[1]);
}

fn render_status_bar<S: LocalStore>(f: &mut Frame, app: &App<S>, area: Rect) {
    let (text, style) = if let Some(label) = app.loading_label() {
        (label.to_string(), Style::default().fg(SAFFRON))
    } else if let Some(ref notification) = app.notification {
        let color = match notification.kind {
            NotificationKind::Success => FOREST,
            NotificationKind::Error => Color::Red,
        };
        (
            format!("{}: {}", notification.title, notification.description),
            Style::default().fg(color),
        )
    } else {
        (hints(app).to_string(), Style::default())
    };

    let status = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .style(style);
    f.render_widget(status, area);
}

fn hints<S: LocalStore>(app: &App<S>) -> &'static str {
    match (app.route, app.modal) {
        (_, Some(Modal::DigitalId)) => "Esc/Enter: close",
        (_, Some(Modal::BusinessRegistration)) => {
            "Tab/↑↓: field | ←→: choose | Enter: register | Esc: cancel | Ctrl+C: quit"
        }
        (Route::Login, None) => "Tab/↑↓: field | Enter: sign in | Ctrl+G: Gmail | Ctrl+C: quit",
        (Route::Application, None) => {
            "Tab/↑↓: field | ←→: choose | Enter: submit | Ctrl+C: quit"
        }
        (Route::Dashboard, None) => "d: digital ID | b: register business | l: logout | q: quit",
    }
}

fn render_digital_id<S: LocalStore>(f: &mut Frame, app: &App<S>) {
    let Some(card) = app.digital_id_card(today()) else {
        return;
    };
    let popup_area = centered(f.area(), 50, 70);
    f.render_widget(Clear, popup_area);

    let initial = card.initial.map(String::from).unwrap_or_default();
    let lines = vec![
        Line::from(Span::styled(
            "Kingdom of Bhutan",
            Style::default().fg(SAFFRON).add_modifier(Modifier::BOLD),
        )),
        Line::from("e-Residency Digital ID"),
        Line::from(""),
        Line::from(Span::styled(
            format!("( {initial} )  {}", card.full_name),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(format!("ID Number:       {}", card.id_number)),
        Line::from(format!("Date of Birth:   {}", card.date_of_birth)),
        Line::from(format!("Valid Until:     {}", card.valid_until_year)),
        Line::from(format!(
            "Business Status: {}",
            if card.business_approved { "✅" } else { "❌" }
        )),
        Line::from(""),
        Line::from(Span::styled(
            "This is an official digital identification",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "issued by the Kingdom of Bhutan",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    let widget = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Digital ID")
                .style(Style::default().fg(FOREST)),
        )
        .style(Style::default().fg(Color::White));
    f.render_widget(widget, popup_area);
}

fn render_business_registration<S: LocalStore>(f: &mut Frame, app: &App<S>) {
    let popup_area = centered(f.area(), 70, 85);
    f.render_widget(Clear, popup_area);

    let mut lines = form_lines(app, app.fields());
    lines.push(Line::from(Span::styled("ID Number", Style::default().fg(Color::Gray))));
    lines.push(Line::from(format!("  {}", app.business_form.id_number)));
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("Esc: Cancel   "),
        Span::styled(
            format!("[ {} ]", app.loading_label().unwrap_or("Register Business")),
            Style::default().fg(Color::Black).bg(SAFFRON).add_modifier(Modifier::BOLD),
        ),
    ]));

    let widget = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title("e-Business Registration"))
        .wrap(Wrap { trim: false });
    f.render_widget(widget, popup_area);
}

/// A rectangle of the given percentage size centered in `area`.
fn centered(area: Rect, width_percent: u16, height_percent: u16) -> Rect {
    let width = (u32::from(area.width) * u32::from(width_percent) / 100) as u16;
    let height = (u32::from(area.height) * u32::from(height_percent) / 100) as u16;
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
