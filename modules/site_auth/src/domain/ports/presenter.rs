use crate::contract::model::{PhoneFlow, SessionView};
use crate::domain::ui::{Form, Modal, ModalState};

/// A single change to the visible page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiUpdate {
    /// Blocking message box.
    Alert(String),
    Session(SessionView),
    Modal { modal: Modal, state: ModalState },
    ScrollLock(bool),
    FormReset(Form),
    CodeEntry { flow: PhoneFlow, visible: bool },
    /// Tab switch inside a modal: one form shown, its sibling hidden.
    FormsShown { shown: Form, hidden: Form },
    NavMenu { open: bool },
    SubmitControl { form: Form, disabled: bool, label: String },
}

/// Output port towards the page (DOM surface). No knowledge of markup.
pub trait Presenter: Send + Sync + 'static {
    fn present(&self, update: &UiUpdate);
}
