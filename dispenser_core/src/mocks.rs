//! Test and helper mocks for dispenser_core

use async_trait::async_trait;
use dispenser_traits::{ControllerCommand, ControllerLink, LinkResult};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// A link whose outcomes are scripted by flags; records every command it
/// was asked to deliver. Useful for driving the dispatcher and session
/// controller without a network.
pub struct ScriptedLink {
    accept_commands: AtomicBool,
    reachable: AtomicBool,
    commands: Mutex<Vec<ControllerCommand>>,
}

impl Default for ScriptedLink {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedLink {
    /// Accepts commands and answers pings.
    pub fn new() -> Self {
        Self {
            accept_commands: AtomicBool::new(true),
            reachable: AtomicBool::new(true),
            commands: Mutex::new(Vec::new()),
        }
    }

    pub fn set_accept_commands(&self, accept: bool) {
        self.accept_commands.store(accept, Ordering::Relaxed);
    }

    pub fn set_reachable(&self, reachable: bool) {
        self.reachable.store(reachable, Ordering::Relaxed);
    }

    /// Commands delivered so far, in order.
    pub fn sent(&self) -> Vec<ControllerCommand> {
        self.commands.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ControllerLink for ScriptedLink {
    async fn command(&self, command: ControllerCommand) -> LinkResult<()> {
        if let Ok(mut sent) = self.commands.lock() {
            sent.push(command);
        }
        if self.accept_commands.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(Box::new(std::io::Error::other("controller refused command")))
        }
    }

    async fn ping(&self) -> LinkResult<()> {
        if self.reachable.load(Ordering::Relaxed) {
            Ok(())
        } else {
            Err(Box::new(std::io::Error::other("no route to controller")))
        }
    }
}
