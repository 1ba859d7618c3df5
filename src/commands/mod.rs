//! Commands the GUI layer sends to a running session.
//!
//! The GUI never calls into the controller directly. It holds a
//! [`CommandHandle`] and every call below turns into a [`Command`] that the
//! controller applies between events:
//! - [`CommandHandle::open_files`], [`CommandHandle::open_folder`] and
//!   [`CommandHandle::open_mixed`]: start a discovery run
//! - [`CommandHandle::update_settings`]: model and background for new jobs
//! - [`CommandHandle::clear_completed`] and [`CommandHandle::remove`]: prune the file list
//! - [`CommandHandle::shutdown`]: end the session

mod session;

pub use session::*;
