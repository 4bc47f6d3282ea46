//! User confirmation channel
//!
//! Dialogs are owned by a single interaction context: a dedicated thread
//! started for each scan. Workers never present anything themselves. They
//! send an [`InteractionRequest`] to that thread and block until it
//! answers. Closing the context answers everything still queued with
//! [`InteractionError::ContextClosed`].

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, SyncSender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Error,
}

/// Something to show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionRequest {
    /// Yes/no question.
    Confirm { message: String, title: String },
    /// Feedback after an action.
    Notify {
        message: String,
        title: String,
        severity: Severity,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionResponse {
    Yes,
    No,
    Acknowledged,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InteractionError {
    #[error("interaction context is no longer accepting requests")]
    ContextClosed,
}

/// Presents dialogs to the user.
///
/// Implementations are only ever called from the interaction context, one
/// request at a time.
pub trait Interaction: Send + Sync {
    fn confirm(&self, message: &str, title: &str) -> bool;

    fn notify(&self, message: &str, title: &str, severity: Severity);

    fn present(&self, request: &InteractionRequest) -> InteractionResponse {
        match request {
            InteractionRequest::Confirm { message, title } => {
                if self.confirm(message, title) {
                    InteractionResponse::Yes
                } else {
                    InteractionResponse::No
                }
            }
            InteractionRequest::Notify {
                message,
                title,
                severity,
            } => {
                self.notify(message, title, *severity);
                InteractionResponse::Acknowledged
            }
        }
    }
}

/// Answers "no" to every question and logs notifications.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDecline;

impl Interaction for AutoDecline {
    fn confirm(&self, message: &str, title: &str) -> bool {
        tracing::info!(title, "Declining without asking: {}", message);
        false
    }

    fn notify(&self, message: &str, title: &str, severity: Severity) {
        match severity {
            Severity::Info => tracing::info!(title, "{}", message),
            Severity::Error => tracing::warn!(title, "{}", message),
        }
    }
}

/// A queued request and where its answer goes.
struct Job {
    request: InteractionRequest,
    reply: SyncSender<InteractionResponse>,
}

#[derive(Clone)]
enum Route {
    /// Present on the calling thread, one request at a time.
    Inline {
        interaction: Arc<dyn Interaction>,
        serial: Arc<Mutex<()>>,
    },
    /// Queue for the executor thread.
    Executor {
        context: ThreadId,
        interaction: Arc<dyn Interaction>,
        requests: Sender<Job>,
        closed: Arc<AtomicBool>,
    },
    /// No context to present on.
    Closed,
}

/// A way to reach the interaction context from any thread.
#[derive(Clone)]
pub struct InteractionHandle {
    route: Route,
}

impl InteractionHandle {
    /// Handle that presents on whichever thread asks, one request at a time.
    pub fn direct(interaction: Arc<dyn Interaction>) -> Self {
        Self {
            route: Route::Inline {
                interaction,
                serial: Arc::new(Mutex::new(())),
            },
        }
    }

    /// Handle that refuses every request.
    pub fn closed() -> Self {
        Self {
            route: Route::Closed,
        }
    }

    /// Present `request` on the interaction context and wait for the answer.
    ///
    /// Runs inline on a direct handle, or when called from the executor
    /// thread itself. Otherwise the request is queued and this thread
    /// blocks until the executor answers or drops it.
    pub fn present_and_await(
        &self,
        request: InteractionRequest,
    ) -> Result<InteractionResponse, InteractionError> {
        match &self.route {
            Route::Inline {
                interaction,
                serial,
            } => {
                let _serial = serial.lock().unwrap_or_else(PoisonError::into_inner);
                Ok(interaction.present(&request))
            }
            Route::Executor {
                context,
                interaction,
                ..
            } if thread::current().id() == *context => Ok(interaction.present(&request)),
            Route::Executor {
                requests, closed, ..
            } => {
                if closed.load(Ordering::SeqCst) {
                    return Err(InteractionError::ContextClosed);
                }
                let (reply, response) = mpsc::sync_channel(1);
                requests
                    .send(Job { request, reply })
                    .map_err(|_| InteractionError::ContextClosed)?;
                response.recv().map_err(|_| InteractionError::ContextClosed)
            }
            Route::Closed => Err(InteractionError::ContextClosed),
        }
    }
}

/// Single-threaded executor that owns the dialogs for one scan.
///
/// Dropping it closes the context without waiting for a dialog that is
/// still open: queued and late requests are refused, and the thread exits
/// once the last handle is gone.
pub struct InteractionExecutor {
    requests: Option<Sender<Job>>,
    closed: Arc<AtomicBool>,
    context: ThreadId,
    interaction: Arc<dyn Interaction>,
    thread: Option<JoinHandle<()>>,
}

impl InteractionExecutor {
    pub fn spawn(interaction: Arc<dyn Interaction>) -> io::Result<Self> {
        let (requests, inbox) = mpsc::channel::<Job>();
        let closed = Arc::new(AtomicBool::new(false));
        let thread = {
            let interaction = interaction.clone();
            let closed = closed.clone();
            thread::Builder::new()
                .name("mapdeck-interaction".into())
                .spawn(move || serve(interaction.as_ref(), &inbox, &closed))?
        };
        Ok(Self {
            requests: Some(requests),
            closed,
            context: thread.thread().id(),
            interaction,
            thread: Some(thread),
        })
    }

    pub fn handle(&self) -> InteractionHandle {
        match &self.requests {
            Some(requests) => InteractionHandle {
                route: Route::Executor {
                    context: self.context,
                    interaction: self.interaction.clone(),
                    requests: requests.clone(),
                    closed: self.closed.clone(),
                },
            },
            None => InteractionHandle::closed(),
        }
    }
}

impl Drop for InteractionExecutor {
    fn drop(&mut self) {
        self.closed.store(true, Ordering::SeqCst);
        drop(self.requests.take());
        if let Some(thread) = self.thread.take() {
            if thread.is_finished() {
                let _ = thread.join();
            } else {
                tracing::debug!("Interaction context closed with a dialog still open");
            }
        }
    }
}

fn serve(interaction: &dyn Interaction, inbox: &Receiver<Job>, closed: &AtomicBool) {
    for Job { request, reply } in inbox {
        if closed.load(Ordering::SeqCst) {
            // dropping `reply` answers with `ContextClosed`
            continue;
        }
        let response = interaction.present(&request);
        // The asking task may have given up.
        let _ = reply.send(response);
    }
}
