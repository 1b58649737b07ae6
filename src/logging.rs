use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use serde_json::{json, Map, Value};
use tokio::{
    sync::oneshot::{self, Receiver, Sender},
    task::JoinHandle,
};
use tracing::{info_span, Span};
use tracing_forest::{processor::from_fn, traits::*, tree::Tree, worker_task};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter, Layer, Registry};
use uuid::Uuid;

#[allow(dead_code)]
struct LogGlobal {
    handle: JoinHandle<()>,
}

lazy_static! {
    static ref SPAN_MAP: Mutex<HashMap<Uuid, Sender<Tree>>> = Mutex::new(HashMap::new());
    static ref LOG_GLOBAL: Mutex<Option<LogGlobal>> = Mutex::new(None);
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// A root span whose whole subtree of events gets collected by tracing-forest
/// and can be handed back to the requester, e.g. as the `logs` of a
/// `?debug` dashboard request.
///
/// Anything awaited on behalf of the span needs to be wrapped with
/// `.instrument(logged_span.span.clone())` for its events to land here.
/// Only meaningful once `init_logging()` has run; see `logging_initialized()`.
pub struct LoggedSpan {
    pub span: Span,
    rx: Receiver<Tree>,
}

pub fn render_forest_to_value(tree: &Tree) -> Value {
    match tree {
        Tree::Span(span) => {
            json!({
                "name": span.name(),
                "nodes": span.nodes().iter().map(render_forest_to_value).collect::<Vec<Value>>(),
            })
        }
        Tree::Event(event) => {
            let mut obj = Map::new();
            if let Some(msg) = event.message() {
                obj.insert("message".to_string(), json!(msg));
            }
            for field in event.fields() {
                obj.insert(field.key().to_string(), json!(field.value()));
            }
            json!(obj)
        }
    }
}

impl LoggedSpan {
    pub fn new_logged_span(name: &str) -> LoggedSpan {
        let id = Uuid::new_v4();

        let span = info_span!(parent: None, "logged_span", name, uuid = %id);
        span.in_scope(|| info!("logged_span_start"));
        let (tx, rx) = oneshot::channel();

        lock(&*SPAN_MAP).insert(id, tx);

        LoggedSpan { span, rx }
    }

    /// Close the span and wait for tracing-forest to hand us its tree.  Every
    /// clone of `span` must have been dropped by now or this never resolves.
    pub async fn retrieve(self) -> Option<Tree> {
        self.span.in_scope(|| info!("logged_span_end"));
        drop(self.span);
        self.rx.await.ok()
    }

    pub async fn retrieve_serde_json(self) -> Value {
        match self.retrieve().await {
            Some(tree) => render_forest_to_value(&tree),
            None => Value::Null,
        }
    }
}

pub fn logging_initialized() -> bool {
    lock(&*LOG_GLOBAL).is_some()
}

/// Initialize logging.  tracing-forest is always installed (at
/// `cluster_gui=trace`) so `LoggedSpan` works; if the environment variable
/// `RUST_LOG` is set to a non-empty value we additionally print compact logs
/// filtered by it.
///
/// Must be called from within the tokio runtime since the forest worker is a
/// spawned task.
pub fn init_logging() {
    if logging_initialized() {
        return;
    }

    let mut layers = Vec::new();
    // An empty RUST_LOG is treated the same as an unset one; service wrappers
    // like to export the variable unconditionally.
    if let Ok(rustlog) = std::env::var("RUST_LOG") {
        if !rustlog.is_empty() {
            if let Ok(env_filter) = EnvFilter::try_from_default_env() {
                let layer = tracing_subscriber::fmt::layer()
                    .with_span_events(FmtSpan::ENTER | FmtSpan::EXIT)
                    .compact()
                    // Logs go to the service journal, which doesn't want ANSI
                    // or a second timestamp.
                    .with_ansi(false)
                    .without_time()
                    .with_filter(env_filter)
                    .boxed();
                layers.push(layer);
            }
        }
    }

    let handle = tokio::spawn(
        worker_task()
            .set_global(true)
            .map_receiver(|_| {
                // Every finished root span comes through here; the ones a
                // LoggedSpan is waiting on get forwarded to it.
                from_fn(|tree| {
                    if let Tree::Span(span) = &tree {
                        let id = span.uuid();
                        if let Some(tx) = lock(&*SPAN_MAP).remove(&id) {
                            // The requester may have gone away; that's fine.
                            let _ = tx.send(tree);
                        }
                    }
                    Ok(())
                })
            })
            .build_with(|layer| {
                layers.push(layer.boxed());
                Registry::default()
                    .with(layers)
                    .with(EnvFilter::new("cluster_gui=trace"))
            })
            .on(async {
                // Run until the process is asked to stop.
                let _ = tokio::signal::ctrl_c().await;
            }),
    );

    *lock(&*LOG_GLOBAL) = Some(LogGlobal { handle });
}
