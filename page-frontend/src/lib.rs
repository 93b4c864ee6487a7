//! Browser behavior layer for the portfolio site: work-hours clock, feature
//! initializer, typewriter and chart wiring, contact form and page effects.

pub mod counters;
pub mod effects;
pub mod frame_loop;
pub mod error;
pub mod initializer;
pub mod menu;
pub mod particles;
pub mod scroll;
pub mod skill_bars;
pub mod typewriter;

#[cfg(target_arch = "wasm32")]
mod background;
#[cfg(target_arch = "wasm32")]
mod charts;
#[cfg(target_arch = "wasm32")]
mod contact;
#[cfg(target_arch = "wasm32")]
mod dom;
#[cfg(target_arch = "wasm32")]
mod listener;
#[cfg(target_arch = "wasm32")]
mod page;
#[cfg(target_arch = "wasm32")]
mod reveal;
#[cfg(target_arch = "wasm32")]
mod work_clock;

pub use error::FrontendError;
pub use initializer::{Feature, FeatureRegistry, InitReport, PresenceProbe};

#[cfg(target_arch = "wasm32")]
pub use page::{mount, show_notification, Portfolio};
