use crate::dashboard::load::{DashboardData, DashboardParams};

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardState {
    Idle,
    Loading {
        generation: u64,
        params: DashboardParams,
    },
    Success {
        generation: u64,
        params: DashboardParams,
        data: DashboardData,
    },
    Error {
        generation: u64,
        params: DashboardParams,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    ParamsChanged {
        generation: u64,
        params: DashboardParams,
    },
    Loaded {
        generation: u64,
        data: DashboardData,
    },
    Failed {
        generation: u64,
        message: String,
    },
    Reset,
}

impl DashboardState {
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            DashboardState::Success { .. } | DashboardState::Error { .. }
        )
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, DashboardState::Loading { .. })
    }

    pub fn generation(&self) -> Option<u64> {
        match self {
            DashboardState::Idle => None,
            DashboardState::Loading { generation, .. }
            | DashboardState::Success { generation, .. }
            | DashboardState::Error { generation, .. } => Some(*generation),
        }
    }

    pub fn params(&self) -> Option<&DashboardParams> {
        match self {
            DashboardState::Idle => None,
            DashboardState::Loading { params, .. }
            | DashboardState::Success { params, .. }
            | DashboardState::Error { params, .. } => Some(params),
        }
    }
}

/// Completions only land on the `Loading` state of their own generation;
/// anything else is a stale response and leaves the state untouched.
pub fn reduce(state: DashboardState, action: Action) -> DashboardState {
    match (state, action) {
        (_, Action::ParamsChanged { generation, params }) => {
            DashboardState::Loading { generation, params }
        }
        (_, Action::Reset) => DashboardState::Idle,
        (
            DashboardState::Loading { generation, params },
            Action::Loaded {
                generation: done,
                data,
            },
        ) if generation == done => DashboardState::Success {
            generation,
            params,
            data,
        },
        (
            DashboardState::Loading { generation, params },
            Action::Failed {
                generation: done,
                message,
            },
        ) if generation == done => DashboardState::Error {
            generation,
            params,
            message,
        },
        (state, _) => state,
    }
}
