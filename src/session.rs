//! Server-side sessions keyed by a random cookie, plus the flash messages that
//! ride along with them across redirects.

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
    time::{Duration, Instant},
};

use serde::Serialize;
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "guisession";

/// Sessions nobody has touched for this long are dropped.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(3600);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageLevel {
    Success,
    Info,
    Warning,
    Danger,
}

/// A message shown once at the top of the next rendered page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct GuiMessage {
    pub level: MessageLevel,
    pub text: String,
}

/// Collects messages while a request is handled.  Rendering a page drains the
/// session's queued messages in front of these; redirecting queues these on
/// the session for the page after.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GuiMessages {
    messages: Vec<GuiMessage>,
}

impl GuiMessages {
    pub fn new() -> Self {
        GuiMessages::default()
    }

    fn add(&mut self, level: MessageLevel, text: impl Into<String>) {
        self.messages.push(GuiMessage {
            level,
            text: text.into(),
        });
    }

    pub fn add_success(&mut self, text: impl Into<String>) {
        self.add(MessageLevel::Success, text)
    }

    pub fn add_danger(&mut self, text: impl Into<String>) {
        self.add(MessageLevel::Danger, text)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_vec(self) -> Vec<GuiMessage> {
        self.messages
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Session {
    pub username: String,
    pub namespace: String,
    /// Backend token; sent along with every backend call.
    pub token: String,
    /// Browser offset from UTC in minutes, as JavaScript reports it.
    pub time_zone_offset: Option<i64>,
    pub messages: Vec<GuiMessage>,
}

#[derive(Debug)]
struct StoredSession {
    session: Session,
    last_seen: Instant,
}

/// Sessions live in memory only.  Idle ones are swept whenever a session is
/// created or looked up, so abandoned browsers don't pile up.
#[derive(Debug)]
pub struct SessionStore {
    sessions: Mutex<HashMap<Uuid, StoredSession>>,
    idle_ttl: Duration,
}

impl Default for SessionStore {
    fn default() -> Self {
        SessionStore::with_idle_ttl(DEFAULT_IDLE_TTL)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        SessionStore::default()
    }

    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        SessionStore {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<Uuid, StoredSession>> {
        self.sessions
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn sweep(&self, sessions: &mut HashMap<Uuid, StoredSession>, now: Instant) {
        let before = sessions.len();
        let idle_ttl = self.idle_ttl;
        sessions.retain(|_, stored| now.saturating_duration_since(stored.last_seen) <= idle_ttl);
        let swept = before - sessions.len();
        if swept > 0 {
            debug!(swept, live = sessions.len(), "dropped idle sessions");
        }
    }

    pub fn create(&self, session: Session) -> Uuid {
        self.renew(None, session)
    }

    /// Store `session` under `current` when that still names a live session,
    /// otherwise under a fresh id.  Signing in again from the same browser
    /// replaces its entry instead of adding one.
    pub fn renew(&self, current: Option<&Uuid>, session: Session) -> Uuid {
        let now = Instant::now();
        let mut sessions = self.lock();
        self.sweep(&mut sessions, now);
        let id = match current {
            Some(id) if sessions.contains_key(id) => *id,
            _ => Uuid::new_v4(),
        };
        sessions.insert(
            id,
            StoredSession {
                session,
                last_seen: now,
            },
        );
        id
    }

    /// A snapshot of the session; changes go through `update`.  Looking a
    /// session up counts as activity.
    pub fn get(&self, id: &Uuid) -> Option<Session> {
        let now = Instant::now();
        let mut sessions = self.lock();
        self.sweep(&mut sessions, now);
        sessions.get_mut(id).map(|stored| {
            stored.last_seen = now;
            stored.session.clone()
        })
    }

    pub fn update<F: FnOnce(&mut Session)>(&self, id: &Uuid, f: F) -> bool {
        match self.lock().get_mut(id) {
            Some(stored) => {
                f(&mut stored.session);
                true
            }
            None => false,
        }
    }

    pub fn remove(&self, id: &Uuid) -> Option<Session> {
        self.lock().remove(id).map(|stored| stored.session)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn queue_messages(&self, id: &Uuid, messages: GuiMessages) {
        if messages.is_empty() {
            return;
        }
        self.update(id, |session| session.messages.extend(messages.into_vec()));
    }

    /// Queued messages followed by `current`, leaving the queue empty.
    pub fn take_messages(&self, id: &Uuid, current: GuiMessages) -> Vec<GuiMessage> {
        let mut out = Vec::new();
        self.update(id, |session| out = std::mem::take(&mut session.messages));
        out.extend(current.into_vec());
        out
    }
}

/// Find our session id in a `Cookie` request header value.
pub fn session_id_from_cookie_header(header: &str) -> Option<Uuid> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
}

pub fn session_cookie(id: &Uuid) -> String {
    format!("{}={}; Path=/; HttpOnly; SameSite=Lax", SESSION_COOKIE, id)
}

pub fn expired_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; Max-Age=0", SESSION_COOKIE)
}
