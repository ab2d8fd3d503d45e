pub mod sms;
pub mod token_stream;
