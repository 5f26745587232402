pub mod spreadsheet;
pub mod trend;
pub mod widget_service;
pub use widget_service::WidgetService;
pub mod page_service;
pub use page_service::PageService;
