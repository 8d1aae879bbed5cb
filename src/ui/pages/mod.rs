pub mod appraisal;
pub mod doctrine_stock;
pub mod settings;

pub use appraisal::AppraisalPage;
pub use doctrine_stock::DoctrineStockPage;
pub use settings::SettingsPage;
