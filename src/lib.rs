//! flog: a log appender that hands formatted lines to a named callable
//!
//! ```
//! use flog::appender::{Appender, DynamicSinkAppender};
//! use flog::callable::CallableRegistry;
//! use flog::event::LogEvent;
//! use flog::layout::PatternLayout;
//!
//! let registry = CallableRegistry::new();
//! registry.register("myapp.sink/write-line", |line| {
//!     println!("{}", line);
//!     Ok(())
//! }).unwrap();
//!
//! let appender = DynamicSinkAppender::builder()
//!     .name("clj")
//!     .callable_identifier("myapp.sink/write-line")
//!     .layout(PatternLayout::new("%p %m").unwrap())
//!     .build(&registry)
//!     .unwrap();
//!
//! appender.append(&LogEvent::new(log::Level::Info, "myapp", "hello")).unwrap();
//! ```

pub mod appender;
pub mod callable;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod filter;
pub mod layout;
pub mod plugin;

pub use appender::{Appender, DynamicSinkAppender, ExceptionPolicy};
pub use callable::{Callable, CallableRegistry, Resolve};
pub use dispatch::Dispatcher;
pub use error::{AppenderError, ConfigurationError, InvocationError, ResolutionError};
pub use event::LogEvent;
