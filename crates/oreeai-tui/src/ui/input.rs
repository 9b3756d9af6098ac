//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use oreeai_core::models::ReplyStatus;

use crate::app::{
    can_add_email_char, can_add_password_char, App, AppState, Focus, LoginFocus, Tab,
    PAGE_SCROLL_SIZE,
};
use crate::form::FormKind;

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::LoggingIn => return handle_login_input(app, key).await,
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::EditingForm => {
            handle_form_input(app, key);
            return Ok(false);
        }
        AppState::Searching => {
            handle_search_input(app, key);
            return Ok(false);
        }
        AppState::Normal | AppState::Quitting => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => {
            app.state = AppState::ConfirmingQuit;
            return Ok(false);
        }
        KeyCode::Char('?') => {
            app.state = AppState::ShowingHelp;
            return Ok(false);
        }
        KeyCode::Char(c @ '1'..='5') => {
            let index = c as usize - '1' as usize;
            app.switch_tab(Tab::ALL[index]);
            return Ok(false);
        }
        KeyCode::Left => {
            app.switch_tab(app.current_tab.prev());
            return Ok(false);
        }
        KeyCode::Right => {
            app.switch_tab(app.current_tab.next());
            return Ok(false);
        }
        KeyCode::Tab | KeyCode::BackTab => {
            app.focus = match app.focus {
                Focus::List => Focus::Detail,
                Focus::Detail => Focus::List,
            };
            return Ok(false);
        }
        KeyCode::Up | KeyCode::Char('k') => {
            navigate(app, -1);
            return Ok(false);
        }
        KeyCode::Down | KeyCode::Char('j') => {
            navigate(app, 1);
            return Ok(false);
        }
        KeyCode::PageUp => {
            navigate(app, -(PAGE_SCROLL_SIZE as isize));
            return Ok(false);
        }
        KeyCode::PageDown => {
            navigate(app, PAGE_SCROLL_SIZE as isize);
            return Ok(false);
        }
        KeyCode::Char('u') => {
            app.status_message = None;
            app.refresh_current_tab();
            return Ok(false);
        }
        KeyCode::Char('/') => {
            if matches!(app.current_tab, Tab::Leads | Tab::Companies | Tab::Replies) {
                app.state = AppState::Searching;
            }
            return Ok(false);
        }
        KeyCode::Char('L') => {
            app.logout().await;
            return Ok(false);
        }
        KeyCode::Esc => {
            app.focus = Focus::List;
            app.status_message = None;
            return Ok(false);
        }
        _ => {}
    }

    match app.current_tab {
        Tab::Dashboard => {}
        Tab::Leads => handle_leads_input(app, key),
        Tab::Companies => handle_companies_input(app, key),
        Tab::Replies => handle_replies_input(app, key),
        Tab::Settings => handle_settings_input(app, key),
    }

    Ok(false)
}

/// Up/down moves the list selection, or scrolls when the detail pane has
/// focus. Settings has no list, so it always scrolls.
fn navigate(app: &mut App, delta: isize) {
    if app.focus == Focus::Detail || app.current_tab == Tab::Settings {
        app.scroll_detail(delta);
    } else {
        app.move_selection(delta);
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.state = AppState::Normal;
            app.search_query.clear();
            app.apply_search();
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
            app.apply_search();
        }
        KeyCode::Backspace => {
            app.search_query.pop();
            if app.current_tab == Tab::Companies {
                app.apply_search();
            }
        }
        KeyCode::Char(c) => {
            app.search_query.push(c);
            // Companies filter in memory, so they can follow every keystroke
            if app.current_tab == Tab::Companies {
                app.apply_search();
            }
        }
        _ => {}
    }
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Email,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Email,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => app.login_focus = LoginFocus::Password,
            LoginFocus::Password => app.login_focus = LoginFocus::Button,
            LoginFocus::Button => {
                // Failure leaves login_error set and the overlay open
                if app.attempt_login().await.is_ok() {
                    app.refresh_current_tab();
                }
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if can_add_email_char(app.login_email.len(), c) {
                    app.login_email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.len(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}

fn handle_form_input(app: &mut App, key: KeyEvent) {
    if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.submit_form();
        return;
    }

    let Some(form) = app.form.as_mut() else {
        app.state = AppState::Normal;
        return;
    };

    match key.code {
        KeyCode::Esc => app.close_form(),
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Enter => {
            if form.on_last_field() {
                app.submit_form();
            } else {
                form.next_field();
            }
        }
        KeyCode::Backspace => form.pop_char(),
        KeyCode::Char(c) => form.push_char(c),
        _ => {}
    }
}

fn handle_leads_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.focus = Focus::Detail;
            app.detail_scroll = 0;
            app.load_lead_detail();
        }
        KeyCode::Char('s') => app.cycle_lead_status(),
        KeyCode::Char('a') => app.open_form(FormKind::AddLead),
        KeyCode::Char('[') => app.change_lead_page(false),
        KeyCode::Char(']') => app.change_lead_page(true),
        _ => {}
    }
}

fn handle_companies_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.focus = Focus::Detail;
            app.detail_scroll = 0;
            app.load_company_detail();
        }
        KeyCode::Char('r') => app.cycle_research_filter(),
        KeyCode::Char('f') => app.open_form(FormKind::CompanyFilter),
        KeyCode::Char('c') => app.clear_company_filter(),
        KeyCode::Char('a') => app.open_form(FormKind::AddCompany),
        _ => {}
    }
}

fn handle_replies_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => {
            app.focus = Focus::Detail;
            app.detail_scroll = 0;
            if app.selected_reply().is_some_and(|r| r.status == ReplyStatus::Unread) {
                app.set_reply_status(ReplyStatus::Read);
            }
        }
        KeyCode::Char('r') => app.set_reply_status(ReplyStatus::Read),
        KeyCode::Char('x') => app.set_reply_status(ReplyStatus::Archived),
        KeyCode::Char('z') => app.set_reply_status(ReplyStatus::Unread),
        KeyCode::Char('s') => app.cycle_reply_status(),
        KeyCode::Char('[') => app.change_reply_page(false),
        KeyCode::Char(']') => app.change_reply_page(true),
        _ => {}
    }
}

fn handle_settings_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('e') => app.open_form(FormKind::Icp),
        KeyCode::Char('p') => app.open_form(FormKind::Profile),
        _ => {}
    }
}
