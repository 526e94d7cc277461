pub mod controller;
pub mod load;
pub mod state;

pub use controller::DashboardController;
pub use load::{load_dashboard, DashboardData, DashboardParams};
pub use state::{Action, DashboardState};
