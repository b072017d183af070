pub mod payments;
pub mod receipts;

pub use payments::PaymentService;
