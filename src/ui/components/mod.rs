pub mod appraisal_table;
pub mod availability_badge;
pub mod kpi_card;
pub mod stock_table;
pub mod toast;
