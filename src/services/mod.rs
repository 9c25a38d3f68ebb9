pub mod convert_service;
pub mod debounce;
pub mod export_service;
pub mod filter_service;
pub mod render_service;
pub mod session;
pub mod stats_service;
pub mod tab_service;

pub use convert_service::{ConversionBackend, ConvertService, ExportFile, HttpBackend};
pub use debounce::Debouncer;
pub use export_service::ExportService;
pub use filter_service::{FilterOutcome, FilterService};
pub use render_service::{RenderService, RenderedInsight, VisibleFact, VisiblePanel};
pub use session::{ConversionOutcome, ExportRequest, InsightSession, PendingConversion};
pub use stats_service::{InsightStats, StatsService};
pub use tab_service::TabService;
