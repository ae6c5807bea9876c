mod app;
mod args;
mod fixture;

pub use app::Application;
pub use fixture::{DryRunHost, SessionFixture};
