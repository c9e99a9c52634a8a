//! Sandboxed execution of user supplied response templates.
//!
//! Templates are rendered with MiniJinja on the blocking thread pool under a wall-clock
//! budget. Failures never propagate: compile errors, render errors, timeouts and oversized
//! output are all converted into a diagnostic string that is shown to the user instead of
//! the rendered response.

pub mod sandbox;

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use minijinja::{AutoEscape, Environment, Value};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::service::variables::Variables;

/// Wall-clock budget for compiling and rendering a single template.
pub const TEMPLATE_TIMEOUT: Duration = Duration::from_millis(300);

/// Longest rendered output, in characters, that may be sent to Discord.
pub const MAX_RESPONSE_LENGTH: usize = 1990;

/// Instruction budget of a single render.
///
/// A render abandoned by its timeout keeps running on its blocking thread until it either
/// finishes or runs out of fuel.
pub const TEMPLATE_FUEL: u64 = 200_000;

static MENTION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@(everyone|here|[!&]?[0-9]{17,20})").expect("valid mention regex"));

/// Where a template is being executed from, used to label diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionOrigin {
    /// Rendering a matched autoresponder.
    AutoResponder,
    /// Rendering on behalf of a command, e.g. `jinja` or the test render of `ar add`.
    Command,
}

impl ExecutionOrigin {
    fn label(self) -> &'static str {
        match self {
            ExecutionOrigin::AutoResponder => "autoresponder",
            ExecutionOrigin::Command => "jinja2",
        }
    }
}

/// Result of executing a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Rendered output, or the diagnostic if `is_error` is set.
    pub content: String,
    pub is_error: bool,
}

impl Rendered {
    fn output(content: String) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    fn error(content: String) -> Self {
        Self {
            content,
            is_error: true,
        }
    }
}

/// Renders templates in a shared sandboxed environment.
///
/// Cloning is cheap; clones share the same lazily built environment.
#[derive(Clone)]
pub struct TemplateExecutor {
    environment: Arc<OnceLock<Environment<'static>>>,
    timeout: Duration,
    fuel: Option<u64>,
}

impl Default for TemplateExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl TemplateExecutor {
    /// Creates an executor with the default timeout and fuel budget.
    pub fn new() -> Self {
        Self::with_limits(TEMPLATE_TIMEOUT, Some(TEMPLATE_FUEL))
    }

    /// Creates an executor with custom limits.
    ///
    /// # Arguments
    /// - `timeout` - Wall-clock budget for compile and render
    /// - `fuel` - Instruction budget per render, `None` for unlimited
    pub fn with_limits(timeout: Duration, fuel: Option<u64>) -> Self {
        Self {
            environment: Arc::new(OnceLock::new()),
            timeout,
            fuel,
        }
    }

    /// Executes a template and converts every failure into a diagnostic.
    ///
    /// Disabled operators are rewritten before compilation and evaluate to an undefined
    /// value, which renders as an empty string.
    ///
    /// # Arguments
    /// - `trigger` - Autoresponder name or command label, quoted in timeout diagnostics
    /// - `source` - Template source
    /// - `variables` - Variables available to the template
    /// - `origin` - Whether an autoresponder or a command is executing the template
    ///
    /// # Returns
    /// - `Rendered` - Output with `is_error` unset, or a diagnostic with `is_error` set
    pub async fn execute(
        &self,
        trigger: &str,
        source: &str,
        variables: Variables,
        origin: ExecutionOrigin,
    ) -> Rendered {
        let what = origin.label();
        let trigger = escape_mentions(trigger);
        let source = sandbox::disable_operators(source);

        let executor = self.clone();
        let render = tokio::task::spawn_blocking(move || executor.render(&source, variables));

        match tokio::time::timeout(self.timeout, render).await {
            Err(_) => {
                tracing::debug!("Template for `{}` timed out", trigger);
                Rendered::error(format!(
                    "Gave up executing {} - `{}`.\nReason: `TimeoutError: rendering took longer than {}ms`",
                    what,
                    trigger,
                    self.timeout.as_millis()
                ))
            }
            Ok(Err(join_error)) => {
                tracing::error!("Template render task failed: {}", join_error);
                Rendered::error(format!(
                    "Gave up executing {}.\nReason: `JoinError: {}`",
                    what, join_error
                ))
            }
            Ok(Ok(Err(error))) => {
                let detail = error
                    .detail()
                    .map(str::to_string)
                    .unwrap_or_else(|| error.to_string());
                Rendered::error(format!(
                    "Gave up executing {}.\nReason: `{:?}: {}`",
                    what,
                    error.kind(),
                    detail
                ))
            }
            Ok(Ok(Ok(content))) if content.chars().count() > MAX_RESPONSE_LENGTH => {
                Rendered::error(format!(
                    "Gave up executing {} - `{}`.\nReason: `Response is too long`",
                    what, trigger
                ))
            }
            Ok(Ok(Ok(content))) => Rendered::output(content),
        }
    }

    fn render(&self, source: &str, variables: Variables) -> Result<String, minijinja::Error> {
        self.environment
            .get_or_init(|| build_environment(self.fuel))
            .render_str(source, variables)
    }
}

fn build_environment(fuel: Option<u64>) -> Environment<'static> {
    let mut environment = Environment::new();
    environment.set_trim_blocks(true);
    environment.set_lstrip_blocks(true);
    environment.set_keep_trailing_newline(false);
    environment.set_auto_escape_callback(|_| AutoEscape::None);
    environment.set_fuel(fuel);
    environment.add_function(sandbox::DISABLED_BINOP_FUNCTION, |_operator: String| {
        Value::UNDEFINED
    });
    environment
}

/// Breaks `@everyone`, `@here` and user or role mentions with a zero width space.
pub fn escape_mentions(text: &str) -> String {
    MENTION_PATTERN
        .replace_all(text, "@\u{200b}$1")
        .into_owned()
}
