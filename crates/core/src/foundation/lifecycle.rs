/// Application lifecycle states as driven by the plugin lifecycle manager
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Created,
    Validated,
    Configured,
    Running,
    Stopping,
    Stopped,
    Failed,
}

impl LifecycleState {
    /// Whether plugins have been initialized and not yet unloaded
    pub fn is_running(&self) -> bool {
        matches!(self, LifecycleState::Running)
    }

    /// Whether `start` may be called from this state
    pub fn can_start(&self) -> bool {
        matches!(self, LifecycleState::Created | LifecycleState::Stopped)
    }
}

impl Default for LifecycleState {
    fn default() -> Self {
        LifecycleState::Created
    }
}

impl std::fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            LifecycleState::Created => "created",
            LifecycleState::Validated => "validated",
            LifecycleState::Configured => "configured",
            LifecycleState::Running => "running",
            LifecycleState::Stopping => "stopping",
            LifecycleState::Stopped => "stopped",
            LifecycleState::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}
