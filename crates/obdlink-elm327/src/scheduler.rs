//! Round-robin command scheduling for the scan loop.
//!
//! The engine keeps exactly one request outstanding: each completed response
//! releases the next command in the rotation. [`CommandScheduler`] holds the
//! rotation and the cursor; it never touches the transport itself, which
//! keeps it trivially unit-testable.

/// Cyclic scheduler over a fixed command rotation.
#[derive(Debug)]
pub struct CommandScheduler {
    commands: Vec<String>,
    cursor: usize,
    active: bool,
}

impl CommandScheduler {
    /// Create a scheduler over `commands`. An empty rotation is allowed and
    /// simply never yields anything.
    pub fn new(commands: Vec<String>) -> Self {
        Self {
            commands,
            cursor: 0,
            active: false,
        }
    }

    /// Whether a scan cycle is currently running.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The command rotation this scheduler cycles through.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Begin a scan cycle from the top of the rotation.
    ///
    /// Returns the first command to send, or `None` for an empty rotation.
    pub fn start(&mut self) -> Option<String> {
        self.active = true;
        self.cursor = 0;
        self.advance()
    }

    /// A response completed: release the next command in the rotation.
    ///
    /// Returns `None` when the scheduler is stopped, so late responses after
    /// [`stop`](Self::stop) never trigger another send.
    pub fn on_response(&mut self) -> Option<String> {
        if !self.active {
            return None;
        }
        self.advance()
    }

    /// Stop the scan cycle. Idempotent.
    pub fn stop(&mut self) {
        self.active = false;
    }

    fn advance(&mut self) -> Option<String> {
        if self.commands.is_empty() {
            return None;
        }
        if self.cursor == self.commands.len() {
            self.cursor = 0;
        }
        let command = self.commands[self.cursor].clone();
        self.cursor += 1;
        Some(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rotation() -> CommandScheduler {
        CommandScheduler::new(vec![
            "ATRV".to_string(),
            "010C".to_string(),
            "010D".to_string(),
        ])
    }

    #[test]
    fn start_yields_first_command() {
        let mut sched = rotation();
        assert_eq!(sched.start().as_deref(), Some("ATRV"));
        assert!(sched.is_active());
    }

    #[test]
    fn responses_walk_the_rotation_and_wrap() {
        let mut sched = rotation();
        assert_eq!(sched.start().as_deref(), Some("ATRV"));
        assert_eq!(sched.on_response().as_deref(), Some("010C"));
        assert_eq!(sched.on_response().as_deref(), Some("010D"));
        assert_eq!(sched.on_response().as_deref(), Some("ATRV"));
        assert_eq!(sched.on_response().as_deref(), Some("010C"));
        assert_eq!(sched.on_response().as_deref(), Some("010D"));
        assert_eq!(sched.on_response().as_deref(), Some("ATRV"));
    }

    #[test]
    fn restart_rewinds_to_the_top() {
        let mut sched = rotation();
        sched.start();
        sched.on_response();
        sched.stop();
        assert_eq!(sched.start().as_deref(), Some("ATRV"));
    }

    #[test]
    fn stopped_scheduler_ignores_responses() {
        let mut sched = rotation();
        sched.start();
        sched.stop();
        assert!(sched.on_response().is_none());
        // Stopping again is harmless.
        sched.stop();
        assert!(!sched.is_active());
    }

    #[test]
    fn empty_rotation_never_yields() {
        let mut sched = CommandScheduler::new(Vec::new());
        assert!(sched.start().is_none());
        assert!(sched.on_response().is_none());
        assert!(sched.is_active());
    }
}
