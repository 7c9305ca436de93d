pub mod contract;
pub mod record;
pub mod report;
