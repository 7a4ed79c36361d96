//! binaan-client: typed access to the binaan child-sponsorship backend
//!
//! Each admin report page (kurikulum, laporan anak binaan, raport, tutor,
//! survey validation) is a feature with its own API calls, state slice and
//! thunks. All of them share one [`AppContext`]: a store built on
//! `binaan-dispatch` plus the HTTP [`Backend`](api::Backend).
//!
//! ```ignore
//! let ctx = AppContext::from_config(&ClientConfig::from_env()?)?;
//! features::laporan_anak::initialize(&ctx, None).await?;
//! let rows = ctx.select(|s| s.anak.list.items.len());
//! ```

pub mod action;
pub mod api;
pub mod cli;
pub mod config;
pub mod context;
pub mod features;
pub mod logging;
pub mod page;
pub mod reducer;
pub mod state;
pub mod testing;

pub use action::Action;
pub use api::{ApiClient, ApiError};
pub use config::{ClientConfig, ConfigError, InitPolicy};
pub use context::{AppContext, AppStore};
pub use reducer::reducer;
pub use state::AppState;
