use crate::{
    bot::{
        command::{invocation_message, reply_text},
        Context,
    },
    error::AppError,
    service::{
        autoresponder::dispatch::should_send,
        template::ExecutionOrigin,
        variables::{build_variables, Variables},
    },
};

/// Label quoted in diagnostics of `jinja` renders.
const JINJA_TRIGGER: &str = "None";

const NO_OUTPUT: &str = "_No output_";

/// Render a Jinja template.
///
/// Only bot owners get the variables of their message; everyone else renders against an
/// empty mapping.
#[poise::command(prefix_command, slash_command, aliases("j2", "jinja2"))]
pub async fn jinja(
    ctx: Context<'_>,
    #[description = "Template to render"]
    #[rest]
    code: String,
) -> Result<(), AppError> {
    let Some(_guard) = ctx.data().locks.try_lock(ctx.author().id.get()) else {
        tracing::debug!("Skipped concurrent `jinja` by {}", ctx.author().id);
        return Ok(());
    };

    let variables = if ctx.framework().options().owners.contains(&ctx.author().id) {
        build_variables(&invocation_message(ctx).await)
    } else {
        Variables::new()
    };

    let rendered = ctx
        .data()
        .executor
        .execute(
            JINJA_TRIGGER,
            &strip_code_fence(&code),
            variables,
            ExecutionOrigin::Command,
        )
        .await;

    if should_send(&rendered.content) {
        reply_text(ctx, rendered.content).await
    } else {
        reply_text(ctx, NO_OUTPUT).await
    }
}

/// Removes a surrounding code block and any stray backticks or newlines around the code.
///
/// A code block is only unwrapped when the input both starts and ends with a fence; its
/// first line, which holds the opening fence and language tag, is dropped.
fn strip_code_fence(code: &str) -> String {
    let code = code.trim();

    let unwrapped = if code.len() > 3 && code.starts_with("```") && code.ends_with("```") {
        let lines: Vec<&str> = code.lines().collect();
        if lines.len() > 2 {
            lines[1..lines.len() - 1].join("\n")
        } else {
            code.to_string()
        }
    } else {
        code.to_string()
    };

    unwrapped.trim_matches('`').trim_matches('\n').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unwraps_fenced_code() {
        assert_eq!(
            strip_code_fence("```jinja\n{{ 1 + 1 }}\n{{ 'a' }}\n```"),
            "{{ 1 + 1 }}\n{{ 'a' }}"
        );
        assert_eq!(strip_code_fence("```\n{{ x }}\n```"), "{{ x }}");
    }

    #[test]
    fn strips_inline_backticks() {
        assert_eq!(strip_code_fence("`{{ x }}`"), "{{ x }}");
        assert_eq!(strip_code_fence("```{{ x }}```"), "{{ x }}");
    }

    #[test]
    fn plain_code_is_kept() {
        assert_eq!(strip_code_fence("hello {{ name }}"), "hello {{ name }}");
    }

    #[test]
    fn registers_aliases() {
        let command = jinja();

        assert_eq!(command.aliases, vec!["j2", "jinja2"]);
    }
}
