use site_auth::domain::ports::{Presenter, UiUpdate};

/// Headless page: alerts go to stdout, everything else to the log.
pub struct ConsolePresenter;

impl Presenter for ConsolePresenter {
    fn present(&self, update: &UiUpdate) {
        match update {
            UiUpdate::Alert(text) => println!("alert: {text}"),
            UiUpdate::Session(view) => {
                tracing::info!(?view, "session view");
            }
            other => tracing::debug!(update = ?other, "ui update"),
        }
    }
}
