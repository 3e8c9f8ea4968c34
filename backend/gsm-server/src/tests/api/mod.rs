mod caller;
mod error;
