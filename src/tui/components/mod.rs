//! # TUI Components
//!
//! This module contains all UI components for the assistant panel.
//!
//! ## Component Architecture
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! Display components that receive all data as fields:
//! - `TitleBar`: model name and status line
//! - `MessageView`: one conversation entry
//! - `SendControls`: Attach / Send / Analyze row (records hitboxes)
//! - `StageList` / `StageCard`: read-only stage and activity cards
//!
//! ### Stateful Components (Event-Driven)
//!
//! Persistent state lives in `TuiState`; a transient wrapper borrows it for
//! one frame or one event:
//! - `InputBox` over `InputBoxState` and the controller's draft
//! - `MessageLog` over `MessageLogState`
//! - `FilePicker` over `FilePickerState`
//! - `TipBanner` over `TipBannerState`
//!
//! ## Props-Based Data Flow
//!
//! Components receive external data as props, never by reaching into `App`:
//!
//! ```rust,ignore
//! title_bar.render(frame, area); // built from app.model_name, app.status_message
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs
//! ├── title_bar.rs
//! ├── tip_banner.rs
//! ├── message.rs
//! ├── message_log.rs
//! ├── send_controls.rs
//! ├── file_picker.rs
//! ├── stage_card.rs
//! └── input_box/
//! ```

mod title_bar;
pub use title_bar::TitleBar;

pub mod file_picker;
pub mod input_box;
pub mod message;
pub mod message_log;
pub mod send_controls;
pub mod stage_card;
pub mod tip_banner;

pub use file_picker::{FilePicker, FilePickerEvent, FilePickerState};
pub use input_box::{InputBox, InputBoxState, InputEvent};
pub use message_log::{MessageLog, MessageLogState};
pub use send_controls::{Button, ButtonAreas, SendControls};
pub use stage_card::StageList;
pub use tip_banner::{TipBanner, TipBannerState};
