#![warn(clippy::pedantic)]

pub mod dictionary;
pub mod error;
pub mod train;

pub use dictionary::Dictionary;
pub use error::DictError;
pub use train::{DEFAULT_DICT_SIZE, train_dictionary, train_dictionary_with, train_from_samples};
