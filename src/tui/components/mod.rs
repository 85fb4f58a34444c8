//! # TUI Components
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as parameters:
//! - `TitleBar`: top bar with user, status and the unseen-content marker
//! - `Message`: one transcript entry
//!
//! ### Stateful Components (Event-Driven)
//!
//! Components that keep local state and emit high-level events:
//! - `InputBox`: message composer
//! - `MessageList`: scrollable transcript with layout caching
//! - `SessionManager`: chat history list with two-step delete
//! - `ProfileEditor`: name fields of the signed-in user
//!
//! Components receive external data as props, never by reaching into `App`.
//! Each file holds the state type, event type, rendering and tests of one
//! component.
//!
//! ```text
//! components/
//! ├── mod.rs             (this file)
//! ├── title_bar.rs
//! ├── message.rs
//! ├── message_list.rs
//! ├── session_manager.rs
//! ├── profile_editor.rs
//! └── input_box/         (composer + text editing core)
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod input_box;
pub mod message;
pub use input_box::{InputBox, InputEvent};
pub mod message_list;
pub use message_list::{MessageList, MessageListState};
pub mod profile_editor;
pub use profile_editor::{ProfileEditor, ProfileEditorState, ProfileEvent};
pub mod session_manager;
pub use session_manager::{SessionEvent, SessionManager, SessionManagerState};
