//! Cloneable handle for driving a running session from other tasks.

use tokio::sync::{mpsc, oneshot};

use super::VariableView;
use crate::core::DashvarError;
use crate::variable::SelectedValue;

/// Messages processed by [`DashboardSession::run`](super::DashboardSession::run).
#[derive(Debug)]
pub enum SessionCommand {
    /// Discrete pick from a dropdown
    Select {
        name: String,
        value: SelectedValue,
        reply: oneshot::Sender<Result<(), DashvarError>>,
    },
    /// Keystroke-level textbox edit
    Type {
        name: String,
        text: String,
        reply: oneshot::Sender<Result<(), DashvarError>>,
    },
    /// Drop cached results and re-fetch one variable
    Refresh {
        name: String,
        reply: oneshot::Sender<Result<(), DashvarError>>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<VariableView>>,
    },
    Shutdown,
}

/// Sends commands to a session.
///
/// Every method fails with [`DashvarError::SessionClosed`] once the session's
/// run loop has stopped.
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionCommand>,
}

impl SessionHandle {
    pub(crate) const fn new(tx: mpsc::UnboundedSender<SessionCommand>) -> Self {
        Self {
            tx,
        }
    }

    /// Picks `value` for `name`. Resolves once the pick has been applied.
    pub async fn select(
        &self,
        name: impl Into<String>,
        value: SelectedValue,
    ) -> Result<(), DashvarError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Select {
            name: name.into(),
            value,
            reply,
        })?;
        rx.await.map_err(|_| DashvarError::SessionClosed)?
    }

    /// Records a textbox edit. Resolves once the edit is queued behind the
    /// debounce window, not when it commits.
    pub async fn type_text(
        &self,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<(), DashvarError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Type {
            name: name.into(),
            text: text.into(),
            reply,
        })?;
        rx.await.map_err(|_| DashvarError::SessionClosed)?
    }

    pub async fn refresh(&self, name: impl Into<String>) -> Result<(), DashvarError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Refresh {
            name: name.into(),
            reply,
        })?;
        rx.await.map_err(|_| DashvarError::SessionClosed)?
    }

    /// Current view of every variable, in load order.
    pub async fn snapshot(&self) -> Result<Vec<VariableView>, DashvarError> {
        let (reply, rx) = oneshot::channel();
        self.send(SessionCommand::Snapshot {
            reply,
        })?;
        rx.await.map_err(|_| DashvarError::SessionClosed)
    }

    /// Stops the run loop. Outstanding queries and timers are dropped.
    pub fn shutdown(&self) {
        let _ = self.tx.send(SessionCommand::Shutdown);
    }

    fn send(&self, command: SessionCommand) -> Result<(), DashvarError> {
        self.tx.send(command).map_err(|_| DashvarError::SessionClosed)
    }
}
