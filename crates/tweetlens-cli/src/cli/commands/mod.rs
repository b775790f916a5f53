pub mod compare;
pub mod dispatch;
pub(crate) mod output;
pub mod run;
pub(crate) mod settings;

pub use dispatch::dispatch;
