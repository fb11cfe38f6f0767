//! Client-side metrics synchronization for the dgos dashboard: fetch a
//! snapshot per tick, validate and normalize it, keep bounded I/O history per
//! agent and publish an immutable model for the view.

pub mod app;
pub mod dashboard;
pub mod demo;
pub mod error;
pub mod fetch;
pub mod history;
pub mod logging;
pub mod normalize;
pub mod profiles;
pub mod registry;
pub mod session;
pub mod types;
pub mod ui;

pub use dashboard::{Dashboard, DashboardModel, TickState, TickStatus};
pub use error::{ErrorReporter, LogReporter, SyncError};
pub use fetch::{HttpSource, MetricsSource, RawSnapshot};
pub use normalize::normalize;
pub use registry::{AgentRegistry, Selection};
pub use session::{DashboardSession, SessionConfig};
pub use types::{AgentId, AgentMetrics, Snapshot};
