//! In-process identity provider. Accounts, OTP delivery and popups are
//! simulated; behaviour and error codes follow the hosted backend.

use std::collections::{HashMap, VecDeque};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;
use uuid::Uuid;

use crate::contract::model::{Identity, PopupRequest, SocialProvider, VerificationHandle};
use crate::domain::ports::{IdentityProvider, ProviderError, ProviderErrorCode};

/// The backend's own minimum password length.
const BACKEND_MIN_PASSWORD: usize = 6;

/// Provider calls, counted for assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityCall {
    SignInWithPassword,
    CreateAccount,
    SignInWithPopup,
    SignInWithPhone,
    ConfirmPhone,
    SignOut,
}

struct Account {
    identity: Identity,
    password: String,
    disabled: bool,
}

struct PendingCode {
    phone: String,
    code: String,
}

#[derive(Default)]
struct State {
    accounts: HashMap<String, Account>,
    phone_accounts: HashMap<String, Identity>,
    pending: HashMap<String, PendingCode>,
    sent_codes: HashMap<String, String>,
    popups: HashMap<SocialProvider, VecDeque<Result<Identity, ProviderErrorCode>>>,
    popup_requests: Vec<PopupRequest>,
    calls: HashMap<IdentityCall, usize>,
    next_code: u32,
    outage: Option<String>,
}

pub struct InMemoryIdentityProvider {
    state: Mutex<State>,
    changes: watch::Sender<Option<Identity>>,
}

impl Default for InMemoryIdentityProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIdentityProvider {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(None);
        Self {
            state: Mutex::new(State {
                next_code: 123_456,
                ..State::default()
            }),
            changes,
        }
    }

    /// Register an email/password account and return its identity.
    pub fn add_account(&self, email: &str, password: &str, display_name: Option<&str>) -> Identity {
        let identity = Identity {
            uid: new_uid(),
            email: Some(email.to_string()),
            phone: None,
            display_name: display_name.map(str::to_string),
        };
        self.state.lock().accounts.insert(
            email.to_ascii_lowercase(),
            Account {
                identity: identity.clone(),
                password: password.to_string(),
                disabled: false,
            },
        );
        identity
    }

    pub fn disable_account(&self, email: &str) {
        if let Some(account) = self
            .state
            .lock()
            .accounts
            .get_mut(&email.to_ascii_lowercase())
        {
            account.disabled = true;
        }
    }

    /// Queue the outcome of the next popup for `provider`.
    pub fn script_popup(&self, provider: SocialProvider, outcome: Result<Identity, ProviderErrorCode>) {
        self.state
            .lock()
            .popups
            .entry(provider)
            .or_default()
            .push_back(outcome);
    }

    /// Every popup request received, oldest first.
    pub fn popup_requests(&self) -> Vec<PopupRequest> {
        self.state.lock().popup_requests.clone()
    }

    /// The code most recently texted to `phone`.
    pub fn last_code(&self, phone: &str) -> Option<String> {
        self.state.lock().sent_codes.get(phone).cloned()
    }

    pub fn call_count(&self, call: IdentityCall) -> usize {
        self.state.lock().calls.get(&call).copied().unwrap_or(0)
    }

    /// Fail every call with a transport error until cleared.
    pub fn set_outage(&self, message: Option<&str>) {
        self.state.lock().outage = message.map(str::to_string);
    }

    /// Push an identity change as if another tab signed in or out.
    pub fn push_identity(&self, identity: Option<Identity>) {
        self.changes.send_replace(identity);
    }

    fn begin(&self, call: IdentityCall) -> Result<(), ProviderError> {
        let mut state = self.state.lock();
        *state.calls.entry(call).or_default() += 1;
        match &state.outage {
            Some(message) => Err(ProviderError::unavailable(message.clone())),
            None => Ok(()),
        }
    }

    fn signed_in(&self, identity: Identity) -> Identity {
        debug!(uid = %identity.uid, "identity signed in");
        self.changes.send_replace(Some(identity.clone()));
        identity
    }
}

fn new_uid() -> String {
    Uuid::new_v4().simple().to_string()
}

fn rejected(code: ProviderErrorCode) -> ProviderError {
    ProviderError::rejected(code)
}

fn is_e164(phone: &str) -> bool {
    phone
        .strip_prefix('+')
        .is_some_and(|digits| (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit()))
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    fn identity_changes(&self) -> watch::Receiver<Option<Identity>> {
        self.changes.subscribe()
    }

    fn current_identity(&self) -> Option<Identity> {
        self.changes.borrow().clone()
    }

    async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, ProviderError> {
        self.begin(IdentityCall::SignInWithPassword)?;
        let identity = {
            let state = self.state.lock();
            let account = state
                .accounts
                .get(&email.to_ascii_lowercase())
                .ok_or_else(|| rejected(ProviderErrorCode::UserNotFound))?;
            if account.disabled {
                return Err(rejected(ProviderErrorCode::UserDisabled));
            }
            if account.password != password {
                return Err(rejected(ProviderErrorCode::WrongPassword));
            }
            account.identity.clone()
        };
        Ok(self.signed_in(identity))
    }

    async fn create_account_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Identity, ProviderError> {
        self.begin(IdentityCall::CreateAccount)?;
        if password.chars().count() < BACKEND_MIN_PASSWORD {
            return Err(rejected(ProviderErrorCode::WeakPassword));
        }
        if self
            .state
            .lock()
            .accounts
            .contains_key(&email.to_ascii_lowercase())
        {
            return Err(rejected(ProviderErrorCode::EmailAlreadyInUse));
        }
        let identity = self.add_account(email, password, None);
        Ok(self.signed_in(identity))
    }

    async fn sign_in_with_popup(&self, request: &PopupRequest) -> Result<Identity, ProviderError> {
        self.begin(IdentityCall::SignInWithPopup)?;
        let outcome = {
            let mut state = self.state.lock();
            state.popup_requests.push(request.clone());
            state
                .popups
                .get_mut(&request.provider)
                .and_then(VecDeque::pop_front)
                .unwrap_or(Err(ProviderErrorCode::PopupClosedByUser))
        };
        let identity = outcome.map_err(rejected)?;
        Ok(self.signed_in(identity))
    }

    async fn sign_in_with_phone(
        &self,
        phone_number: &str,
    ) -> Result<VerificationHandle, ProviderError> {
        self.begin(IdentityCall::SignInWithPhone)?;
        if !is_e164(phone_number) {
            return Err(rejected(ProviderErrorCode::InvalidPhoneNumber));
        }

        let mut state = self.state.lock();
        let code = format!("{:06}", state.next_code % 1_000_000);
        state.next_code = state.next_code.wrapping_add(111_111);

        // A new request for the same number invalidates the previous one.
        state.pending.retain(|_, p| p.phone != phone_number);

        let handle = Uuid::new_v4().simple().to_string();
        state.pending.insert(
            handle.clone(),
            PendingCode {
                phone: phone_number.to_string(),
                code: code.clone(),
            },
        );
        state.sent_codes.insert(phone_number.to_string(), code);
        Ok(VerificationHandle::new(handle))
    }

    async fn confirm_phone(
        &self,
        handle: &VerificationHandle,
        code: &str,
    ) -> Result<Identity, ProviderError> {
        self.begin(IdentityCall::ConfirmPhone)?;
        let identity = {
            let mut state = self.state.lock();
            let pending = state
                .pending
                .get(handle.as_str())
                .ok_or_else(|| rejected(ProviderErrorCode::InvalidVerificationId))?;
            if pending.code != code {
                return Err(rejected(ProviderErrorCode::InvalidVerificationCode));
            }
            let phone = pending.phone.clone();
            state.pending.remove(handle.as_str());
            state
                .phone_accounts
                .entry(phone.clone())
                .or_insert_with(|| Identity {
                    uid: new_uid(),
                    email: None,
                    phone: Some(phone),
                    display_name: None,
                })
                .clone()
        };
        Ok(self.signed_in(identity))
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.begin(IdentityCall::SignOut)?;
        self.changes.send_replace(None);
        Ok(())
    }
}
