//! Cookie-backed flash messages
//!
//! Messages added while handling a request are kept in a [`FlashStore`]
//! request extension. If no page consumed them, the flash middleware writes
//! them to the `messages` cookie so the next page can show them.

use actix_web::{HttpMessage, HttpRequest, cookie::Cookie};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};

use crate::api::constants::MESSAGES_COOKIE_NAME;
use crate::services::activity::{FlashMessage, MessageLevel, MessageSink};

/// Per-request message storage
#[derive(Debug, Clone, Default)]
pub struct FlashStore {
    /// Messages carried over from the previous response's cookie
    incoming: Vec<FlashMessage>,
    /// Messages added during this request
    queued: Vec<FlashMessage>,
    had_cookie: bool,
    consumed: bool,
}

impl FlashStore {
    pub fn from_cookie(value: Option<&str>) -> Self {
        let incoming: Vec<FlashMessage> = value.map(decode_messages).unwrap_or_default();
        Self {
            had_cookie: !incoming.is_empty(),
            incoming,
            ..Default::default()
        }
    }

    pub fn had_cookie(&self) -> bool {
        self.had_cookie
    }

    /// Take every pending message; the cookie is cleared on the response
    pub fn take(&mut self) -> Vec<FlashMessage> {
        self.consumed = true;
        let mut all = std::mem::take(&mut self.incoming);
        all.append(&mut self.queued);
        all
    }

    /// Messages still waiting for a page, `None` when the cookie should stay untouched
    pub fn pending(&self) -> Option<Vec<FlashMessage>> {
        if self.consumed {
            return Some(self.queued.clone());
        }
        if self.queued.is_empty() {
            return None;
        }
        let mut all = self.incoming.clone();
        all.extend(self.queued.iter().cloned());
        Some(all)
    }
}

impl MessageSink for FlashStore {
    fn add(&mut self, level: MessageLevel, message: String) {
        self.queued.push(FlashMessage { level, message });
    }
}

pub fn encode_messages(messages: &[FlashMessage]) -> String {
    // Vec<FlashMessage> 的序列化不会失败
    let json = serde_json::to_vec(messages).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Undecodable cookies are treated as empty
pub fn decode_messages(value: &str) -> Vec<FlashMessage> {
    URL_SAFE_NO_PAD
        .decode(value.trim())
        .ok()
        .and_then(|bytes| serde_json::from_slice(&bytes).ok())
        .unwrap_or_default()
}

pub fn messages_cookie(messages: &[FlashMessage]) -> Cookie<'static> {
    Cookie::build(MESSAGES_COOKIE_NAME, encode_messages(messages))
        .path("/")
        .http_only(true)
        .finish()
}

pub fn removal_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(MESSAGES_COOKIE_NAME, "").path("/").finish();
    cookie.make_removal();
    cookie
}

/// Consume the request's messages for rendering in a page
pub fn take_messages(req: &HttpRequest) -> Vec<FlashMessage> {
    req.extensions_mut()
        .get_mut::<FlashStore>()
        .map(FlashStore::take)
        .unwrap_or_default()
}

/// Queue a message from a handler
pub fn add_message(req: &HttpRequest, level: MessageLevel, message: impl Into<String>) {
    if let Some(store) = req.extensions_mut().get_mut::<FlashStore>() {
        store.add(level, message.into());
    }
}
