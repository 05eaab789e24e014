//! Page state that is not tied to the backend: modals, auth tabs, the mobile
//! navigation menu and submit controls.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::domain::ports::{Presenter, UiUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modal {
    Login,
    Signup,
}

/// Modal lifecycle. `Opening` only occurs while switching from another modal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModalState {
    #[default]
    Closed,
    Opening,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Form {
    Login,
    PhoneLogin,
    Signup,
    PhoneSignup,
    Contact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthTab {
    EmailLogin,
    PhoneLogin,
    EmailSignup,
    PhoneSignup,
}

impl AuthTab {
    /// Parse the `data-tab` attribute of a tab button.
    pub fn from_data_tab(value: &str) -> Option<Self> {
        match value {
            "email-login" => Some(Self::EmailLogin),
            "phone-login" => Some(Self::PhoneLogin),
            "email-signup" => Some(Self::EmailSignup),
            "phone-signup" => Some(Self::PhoneSignup),
            _ => None,
        }
    }

    pub fn modal(self) -> Modal {
        match self {
            Self::EmailLogin | Self::PhoneLogin => Modal::Login,
            Self::EmailSignup | Self::PhoneSignup => Modal::Signup,
        }
    }

    /// (shown, hidden) forms for this tab.
    pub fn forms(self) -> (Form, Form) {
        match self {
            Self::EmailLogin => (Form::Login, Form::PhoneLogin),
            Self::PhoneLogin => (Form::PhoneLogin, Form::Login),
            Self::EmailSignup => (Form::Signup, Form::PhoneSignup),
            Self::PhoneSignup => (Form::PhoneSignup, Form::Signup),
        }
    }
}

#[derive(Debug, Clone)]
struct UiState {
    login: ModalState,
    signup: ModalState,
    login_tab: AuthTab,
    signup_tab: AuthTab,
    nav_open: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            login: ModalState::Closed,
            signup: ModalState::Closed,
            login_tab: AuthTab::EmailLogin,
            signup_tab: AuthTab::EmailSignup,
            nav_open: false,
        }
    }
}

impl UiState {
    fn modal_mut(&mut self, modal: Modal) -> &mut ModalState {
        match modal {
            Modal::Login => &mut self.login,
            Modal::Signup => &mut self.signup,
        }
    }

    fn any_open(&self) -> bool {
        self.login != ModalState::Closed || self.signup != ModalState::Closed
    }
}

/// Owns the page's UI state and pushes every change to the presenter.
pub struct SiteUi {
    state: Mutex<UiState>,
    presenter: Arc<dyn Presenter>,
    transition: Duration,
}

impl SiteUi {
    pub fn new(presenter: Arc<dyn Presenter>, transition: Duration) -> Self {
        Self {
            state: Mutex::new(UiState::default()),
            presenter,
            transition,
        }
    }

    pub fn modal_state(&self, modal: Modal) -> ModalState {
        let state = self.state.lock();
        match modal {
            Modal::Login => state.login,
            Modal::Signup => state.signup,
        }
    }

    pub fn scroll_locked(&self) -> bool {
        self.state.lock().any_open()
    }

    pub fn nav_open(&self) -> bool {
        self.state.lock().nav_open
    }

    pub fn active_tab(&self, modal: Modal) -> AuthTab {
        let state = self.state.lock();
        match modal {
            Modal::Login => state.login_tab,
            Modal::Signup => state.signup_tab,
        }
    }

    pub fn open(&self, modal: Modal) {
        self.set_modal(modal, ModalState::Open);
    }

    pub fn close(&self, modal: Modal) {
        self.set_modal(modal, ModalState::Closed);
    }

    /// Close `from`, wait for its transition, then open `to`. Closing `to`
    /// while it is still opening cancels the switch.
    pub async fn switch(&self, from: Modal, to: Modal) {
        self.close(from);
        self.set_modal(to, ModalState::Opening);
        tokio::time::sleep(self.transition).await;

        let still_opening = self.modal_state(to) == ModalState::Opening;
        if still_opening {
            self.set_modal(to, ModalState::Open);
        } else {
            debug!(?to, "modal switch cancelled during transition");
        }
    }

    pub fn select_tab(&self, tab: AuthTab) {
        {
            let mut state = self.state.lock();
            match tab.modal() {
                Modal::Login => state.login_tab = tab,
                Modal::Signup => state.signup_tab = tab,
            }
        }
        let (shown, hidden) = tab.forms();
        self.presenter
            .present(&UiUpdate::FormsShown { shown, hidden });
    }

    pub fn toggle_nav(&self) {
        let open = {
            let mut state = self.state.lock();
            state.nav_open = !state.nav_open;
            state.nav_open
        };
        self.presenter.present(&UiUpdate::NavMenu { open });
    }

    /// Nav links and auth buttons always collapse the mobile menu.
    pub fn close_nav(&self) {
        let was_open = std::mem::replace(&mut self.state.lock().nav_open, false);
        if was_open {
            self.presenter.present(&UiUpdate::NavMenu { open: false });
        }
    }

    fn set_modal(&self, modal: Modal, next: ModalState) {
        let (changed, lock_before, lock_after) = {
            let mut state = self.state.lock();
            let lock_before = state.any_open();
            let slot = state.modal_mut(modal);
            let changed = *slot != next;
            *slot = next;
            (changed, lock_before, state.any_open())
        };

        if changed {
            self.presenter
                .present(&UiUpdate::Modal { modal, state: next });
        }
        if lock_before != lock_after {
            self.presenter.present(&UiUpdate::ScrollLock(lock_after));
        }
    }
}

/// A form's submit button: disabled with a loading label while its flow runs.
/// A disabled control refuses further submits.
pub struct SubmitControl {
    form: Form,
    label: String,
    disabled: AtomicBool,
    presenter: Arc<dyn Presenter>,
}

impl SubmitControl {
    pub fn new(form: Form, label: impl Into<String>, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            form,
            label: label.into(),
            disabled: AtomicBool::new(false),
            presenter,
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::Acquire)
    }

    /// Disable the control until the returned guard is dropped.
    /// `None` while a previous submit still holds it.
    pub fn busy(&self, loading_label: &str) -> Option<SubmitGuard<'_>> {
        if self
            .disabled
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!(form = ?self.form, "submit ignored while busy");
            return None;
        }
        self.presenter.present(&UiUpdate::SubmitControl {
            form: self.form,
            disabled: true,
            label: loading_label.to_string(),
        });
        Some(SubmitGuard { control: self })
    }
}

/// Re-enables its control with the original label on every exit path.
pub struct SubmitGuard<'a> {
    control: &'a SubmitControl,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.control.disabled.store(false, Ordering::Release);
        self.control.presenter.present(&UiUpdate::SubmitControl {
            form: self.control.form,
            disabled: false,
            label: self.control.label.clone(),
        });
    }
}
