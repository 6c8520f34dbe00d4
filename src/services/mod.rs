// Plan-level services built on the parser

pub mod plan_builder_service;
pub mod sheet_layout_service;

pub use plan_builder_service::PlanBuilderService;
pub use sheet_layout_service::SheetLayoutService;
