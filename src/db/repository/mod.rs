mod deals;
mod records;

pub use deals::DealRepository;
pub use records::RecordRepository;
