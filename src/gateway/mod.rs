//! The gateway: session owner, request engine, and the operations built on it.
//!
//! | Module | Description |
//! |--------|-------------|
//! | `core` | [`Gateway`] state and accessors |
//! | `builder` | [`GatewayBuilder`] |
//! | `execution` | The request engine (`execute`) |
//! | `policy` | 503 retry decisions |
//! | `tokens` | Action, undelete, user-rights and options tokens |
//! | `continuation` | Lazy iteration over continued list queries |
//! | `pages`, `media`, `lists`, `site`, `account` | Thin operations over the engine |

mod account;
mod builder;
mod continuation;
mod core;
mod execution;
mod lists;
mod media;
mod pages;
mod policy;
mod site;
mod tokens;

pub use self::builder::GatewayBuilder;
pub use self::continuation::{ListItem, ListIter, ListQuery};
pub use self::core::{ApiResponse, Gateway};
pub use self::lists::BacklinkFilter;
pub use self::media::PageRef;
pub use self::pages::{EditOptions, MoveOptions, ProtectOptions, Protection, UploadOptions, UploadSource};
pub use self::tokens::TokenKind;
