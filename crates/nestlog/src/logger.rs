//! Indent-on-write logging driven by context depth.

use std::fmt::{self, Display};
use std::io::{self, Write};
use std::sync::{Mutex, OnceLock};

use crate::context::Context;
use crate::targets;
use crate::template;

const DEFAULT_INDENT: &str = "\t";

/// A logger that indents each line by the depth of the context it is given
/// and hands back a child context one level deeper.
///
/// The zero-value logger is usable as-is: [`Logger::new`] is `const`, so a
/// `static` logger works, and the default configuration (standard error,
/// one-tab indent) is installed lazily on first use — exactly once, no
/// matter how many threads race to log first.
///
/// Concurrent callers sharing one logger are serialized per line: a logical
/// line is written with a single `write_all`, so lines from different
/// threads never interleave.
///
/// # Example
///
/// ```
/// use nestlog::{Context, Logger};
///
/// let log = Logger::new();
/// let ctx = log.log(&Context::new(), "syncing");
/// let _nested = log.log(&ctx, "fetching remote head");
/// ```
pub struct Logger {
    state: OnceLock<Mutex<State>>,
}

struct State {
    output: Box<dyn Write + Send>,
    indent: String,
}

impl State {
    fn with_defaults() -> Self {
        Self {
            output: Box::new(io::stderr()),
            indent: DEFAULT_INDENT.to_string(),
        }
    }
}

impl Logger {
    /// Creates an unconfigured logger.
    ///
    /// Defaults (standard error, one-tab indent) are installed lazily on
    /// first use; [`set_output`](Logger::set_output) and
    /// [`set_indent`](Logger::set_indent) override them at any point.
    ///
    /// ```
    /// use nestlog::Logger;
    ///
    /// static LOG: Logger = Logger::new();
    /// ```
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: OnceLock::new(),
        }
    }

    /// Creates a builder for a pre-configured logger.
    ///
    /// Unlike the setters, a built logger never goes through the lazy-init
    /// path, so configuration cannot race first use.
    #[must_use]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    /// Sets the output that the logger will write to. Defaults to the
    /// process standard error stream.
    ///
    /// Safe to call before or after the first log call; it always takes
    /// effect for subsequent writes and never races an in-flight write.
    /// Which of a *concurrent* configuration call and log call wins is
    /// unspecified — configure before first concurrent use.
    pub fn set_output<W>(&self, output: W)
    where
        W: Write + Send + 'static,
    {
        if let Ok(mut state) = self.state().lock() {
            state.output = Box::new(output);
        }
    }

    /// Sets the indent unit prepended to log lines, repeated once per depth
    /// level of the logged context. Defaults to `"\t"`.
    ///
    /// Same timing and safety rules as [`set_output`](Logger::set_output).
    pub fn set_indent(&self, indent: impl Into<String>) {
        if let Ok(mut state) = self.state().lock() {
            state.indent = indent.into();
        }
    }

    /// Writes `message`, trimmed of leading and trailing whitespace and
    /// indented by the depth of `ctx`, then returns a child context one
    /// level deeper for use by nested operations.
    ///
    /// A sink write failure is not surfaced; the line is dropped and the
    /// failure reported on the [`log`] facade under
    /// [`targets::SINK`](crate::targets::SINK). Use
    /// [`try_log`](Logger::try_log) to observe the error instead.
    pub fn log(&self, ctx: &Context, message: &str) -> Context {
        match self.try_log(ctx, message) {
            Ok(child) => child,
            Err(err) => {
                log::warn!(target: targets::SINK, "log line dropped: {err}");
                ctx.with_depth(ctx.depth() + 1)
            }
        }
    }

    /// Like [`log`](Logger::log), but renders the message from a runtime
    /// template with positional `{}` placeholders.
    ///
    /// The template is trimmed and the line terminator appended *before*
    /// the arguments are substituted: edge whitespace in the literal
    /// template is removed, edge whitespace contributed by an argument is
    /// preserved.
    ///
    /// The [`logf!`](crate::logf) macro packs arbitrary `Display` arguments
    /// into the slice form:
    ///
    /// ```
    /// use nestlog::{logf, Context, Logger};
    ///
    /// let log = Logger::new();
    /// let ctx = logf!(log, &Context::new(), "synced {} entries in {}ms", 12, 340);
    /// # let _ = ctx;
    /// ```
    pub fn logf(&self, ctx: &Context, template: &str, args: &[&dyn Display]) -> Context {
        match self.try_logf(ctx, template, args) {
            Ok(child) => child,
            Err(err) => {
                log::warn!(target: targets::SINK, "log line dropped: {err}");
                ctx.with_depth(ctx.depth() + 1)
            }
        }
    }

    /// [`log`](Logger::log) that surfaces the sink error instead of
    /// swallowing it.
    ///
    /// # Errors
    ///
    /// Returns the underlying `io::Error` if the sink rejects the write.
    /// The line is not retried.
    pub fn try_log(&self, ctx: &Context, message: &str) -> io::Result<Context> {
        let depth = ctx.depth();
        let mut body = message.trim().to_string();
        body.push('\n');
        self.write_line(depth, &body)?;
        Ok(ctx.with_depth(depth + 1))
    }

    /// [`logf`](Logger::logf) that surfaces the sink error instead of
    /// swallowing it.
    ///
    /// # Errors
    ///
    /// Returns the underlying `io::Error` if the sink rejects the write.
    pub fn try_logf(
        &self,
        ctx: &Context,
        template: &str,
        args: &[&dyn Display],
    ) -> io::Result<Context> {
        let depth = ctx.depth();
        // Order matters: trim the template and append the terminator first,
        // then substitute, so argument whitespace survives.
        let mut tpl = template.trim().to_string();
        tpl.push('\n');
        let body = template::render(&tpl, args);
        self.write_line(depth, &body)?;
        Ok(ctx.with_depth(depth + 1))
    }

    /// Writes one complete line (indent prefix + body) as a single
    /// `write_all` under the state lock.
    fn write_line(&self, depth: usize, body: &str) -> io::Result<()> {
        let Ok(mut state) = self.state().lock() else {
            return Ok(());
        };
        let mut line = state.indent.repeat(depth);
        line.push_str(body);
        state.output.write_all(line.as_bytes())
    }

    fn state(&self) -> &Mutex<State> {
        self.state.get_or_init(|| Mutex::new(State::with_defaults()))
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("initialized", &self.state.get().is_some())
            .finish_non_exhaustive()
    }
}

/// Builder for a pre-configured [`Logger`].
///
/// # Example
///
/// ```
/// use nestlog::Logger;
///
/// let log = Logger::builder()
///     .indent("  ")
///     .build();
/// # let _ = log;
/// ```
pub struct LoggerBuilder {
    output: Option<Box<dyn Write + Send>>,
    indent: Option<String>,
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LoggerBuilder {
    /// Creates a builder with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            output: None,
            indent: None,
        }
    }

    /// Sets the output sink. Defaults to standard error.
    #[must_use]
    pub fn output<W>(mut self, output: W) -> Self
    where
        W: Write + Send + 'static,
    {
        self.output = Some(Box::new(output));
        self
    }

    /// Sets the indent unit. Defaults to `"\t"`.
    #[must_use]
    pub fn indent(mut self, indent: impl Into<String>) -> Self {
        self.indent = Some(indent.into());
        self
    }

    /// Builds the logger with its configuration already seated.
    #[must_use]
    pub fn build(self) -> Logger {
        let logger = Logger::new();
        let state = State {
            output: self.output.unwrap_or_else(|| Box::new(io::stderr())),
            indent: self.indent.unwrap_or_else(|| DEFAULT_INDENT.to_string()),
        };
        // Cannot fail: the lock is freshly created and unset
        let _ = logger.state.set(Mutex::new(state));
        logger
    }
}

impl fmt::Debug for LoggerBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerBuilder")
            .field("has_output", &self.output.is_some())
            .field("indent", &self.indent)
            .finish()
    }
}

/// Logs a message rendered from a `{}` template, returning the child
/// context.
///
/// Expands to [`Logger::logf`] with the arguments packed as `Display`
/// trait objects.
#[macro_export]
macro_rules! logf {
    ($logger:expr, $ctx:expr, $template:expr $(, $arg:expr)* $(,)?) => {
        $logger.logf($ctx, $template, &[$(&$arg as &dyn ::std::fmt::Display),*])
    };
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct CaptureSink(Arc<Mutex<Vec<u8>>>);

    impl CaptureSink {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for CaptureSink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct FailingSink;

    impl Write for FailingSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn captured_logger() -> (Logger, CaptureSink) {
        let sink = CaptureSink::default();
        let logger = Logger::builder().output(sink.clone()).build();
        (logger, sink)
    }

    #[test]
    fn test_log_writes_line_and_increments_depth() {
        let (logger, sink) = captured_logger();
        let ctx = Context::new();

        let child = logger.log(&ctx, "hello");

        assert_eq!(sink.contents(), "hello\n");
        assert_eq!(child.depth(), 1);
        assert_eq!(ctx.depth(), 0);
    }

    #[test]
    fn test_log_increments_by_exactly_one_at_any_depth() {
        let (logger, _sink) = captured_logger();
        for depth in [0, 1, 5, 100] {
            let ctx = Context::new().with_depth(depth);
            assert_eq!(logger.log(&ctx, "m").depth(), depth + 1);
        }
    }

    #[test]
    fn test_log_indents_by_depth() {
        let (logger, sink) = captured_logger();
        let ctx = Context::new().with_depth(3);

        logger.log(&ctx, "nested");

        assert_eq!(sink.contents(), "\t\t\tnested\n");
    }

    #[test]
    fn test_log_trims_message() {
        let (logger, sink) = captured_logger();
        logger.log(&Context::new(), "  hello  ");
        assert_eq!(sink.contents(), "hello\n");
    }

    #[test]
    fn test_empty_message_still_writes_indented_line() {
        let (logger, sink) = captured_logger();
        logger.set_indent(">");
        logger.log(&Context::new().with_depth(2), "   ");
        assert_eq!(sink.contents(), ">>\n");
    }

    #[test]
    fn test_empty_indent_unit_produces_no_prefix() {
        let sink = CaptureSink::default();
        let logger = Logger::builder().output(sink.clone()).indent("").build();

        logger.log(&Context::new().with_depth(10), "flat");

        assert_eq!(sink.contents(), "flat\n");
    }

    #[test]
    fn test_two_logs_on_same_parent_are_independent() {
        let (logger, sink) = captured_logger();
        let parent = Context::new().with_depth(1);

        let a = logger.log(&parent, "first");
        let b = logger.log(&parent, "second");

        assert_eq!(parent.depth(), 1);
        assert_eq!(a.depth(), 2);
        assert_eq!(b.depth(), 2);
        assert_eq!(sink.contents(), "\tfirst\n\tsecond\n");
    }

    #[test]
    fn test_logf_trims_template_before_substitution() {
        let (logger, sink) = captured_logger();

        logf!(logger, &Context::new(), "  count={}  ", 7);

        assert_eq!(sink.contents(), "count=7\n");
    }

    #[test]
    fn test_logf_preserves_argument_whitespace() {
        let (logger, sink) = captured_logger();

        logf!(logger, &Context::new(), "value: {}", "x  ");

        assert_eq!(sink.contents(), "value: x  \n");
    }

    #[test]
    fn test_logf_increments_depth() {
        let (logger, _sink) = captured_logger();
        let ctx = Context::new().with_depth(4);
        let child = logf!(logger, &ctx, "at {}", 4);
        assert_eq!(child.depth(), 5);
    }

    #[test]
    fn test_logf_without_arguments() {
        let (logger, sink) = captured_logger();
        logf!(logger, &Context::new(), "no args");
        assert_eq!(sink.contents(), "no args\n");
    }

    #[test]
    fn test_log_swallows_write_failure() {
        let logger = Logger::builder().output(FailingSink).build();
        let child = logger.log(&Context::new(), "dropped");
        assert_eq!(child.depth(), 1);
    }

    #[test]
    fn test_try_log_surfaces_write_failure() {
        let logger = Logger::builder().output(FailingSink).build();
        let err = logger.try_log(&Context::new(), "dropped").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_try_log_ok_returns_child() {
        let (logger, sink) = captured_logger();
        let child = logger.try_log(&Context::new(), "fine").unwrap();
        assert_eq!(child.depth(), 1);
        assert_eq!(sink.contents(), "fine\n");
    }

    #[test]
    fn test_try_logf_surfaces_write_failure() {
        let logger = Logger::builder().output(FailingSink).build();
        let err = logger
            .try_logf(&Context::new(), "n={}", &[&1 as &dyn Display])
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_set_output_redirects_subsequent_writes() {
        let (logger, first) = captured_logger();
        logger.log(&Context::new(), "one");

        let second = CaptureSink::default();
        logger.set_output(second.clone());
        logger.log(&Context::new(), "two");

        assert_eq!(first.contents(), "one\n");
        assert_eq!(second.contents(), "two\n");
    }

    #[test]
    fn test_set_indent_takes_effect_after_first_use() {
        let (logger, sink) = captured_logger();
        logger.log(&Context::new().with_depth(1), "tabbed");

        logger.set_indent("..");
        logger.log(&Context::new().with_depth(1), "dotted");

        assert_eq!(sink.contents(), "\ttabbed\n..dotted\n");
    }

    #[test]
    fn test_set_output_preserves_default_indent() {
        // Mirrors configuring only the output on a fresh logger: the lazy
        // defaults must be installed first, then the sink overridden.
        let logger = Logger::new();
        let sink = CaptureSink::default();
        logger.set_output(sink.clone());

        logger.log(&Context::new().with_depth(2), "deep");

        assert_eq!(sink.contents(), "\t\tdeep\n");
    }

    #[test]
    fn test_default_logger_is_zero_value_usable() {
        let logger = Logger::default();
        let sink = CaptureSink::default();
        logger.set_output(sink.clone());

        let child = logger.log(&Context::new(), "works");

        assert_eq!(child.depth(), 1);
        assert_eq!(sink.contents(), "works\n");
    }

    #[test]
    fn test_builder_defaults() {
        let builder = LoggerBuilder::new();
        assert!(builder.output.is_none());
        assert!(builder.indent.is_none());
    }

    #[test]
    fn test_builder_indent() {
        let sink = CaptureSink::default();
        let logger = Logger::builder().output(sink.clone()).indent("--").build();

        logger.log(&Context::new().with_depth(2), "dashed");

        assert_eq!(sink.contents(), "----dashed\n");
    }

    #[test]
    fn test_builder_debug() {
        let builder = LoggerBuilder::new().indent("  ");
        let debug = format!("{builder:?}");
        assert!(debug.contains("LoggerBuilder"));
    }

    #[test]
    fn test_logger_debug_reports_initialization() {
        let logger = Logger::new();
        assert!(format!("{logger:?}").contains("initialized: false"));

        logger.set_indent(" ");
        assert!(format!("{logger:?}").contains("initialized: true"));
    }
}
