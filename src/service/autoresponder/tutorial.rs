//! Help texts shown by `autoresponder tutorial`.

pub const TUTORIAL_TITLE: &str = "Autoresponder Tutorial";

pub const TUTORIAL_DESCRIPTION: &str = "Autoresponders are messages that are sent when a user \
sends a message that matches a certain pattern. For example, you can set up an autoresponder \
that sends a message when a user says `hello there`. Autoresponders can be used to create \
commands, or to send a message when a user says a certain word.";

/// `(name, value)` fields of the general tutorial embed.
pub const TUTORIAL_FIELDS: [(&str, &str); 3] = [
    (
        "Creating an autoresponder",
        "To create an autoresponder, use the command `ar add <name> <response>`. The name of \
the autoresponder must be unique and longer than 5 characters. The name is a case-insensitive \
regular expression that has to match the whole message.",
    ),
    (
        "Making the response dynamic",
        "Responses are Jinja templates. For example, you can use `<@{{ message.author.id }}>` to \
mention the user who sent the message, or `{{ message.author.name }}` to get their name. Use \
`ar variables` to see everything that is available.",
    ),
    (
        "Limits",
        "Rendering a response may take at most 0.3 seconds and produce at most 1990 characters. \
The operators `*`, `**`, `//` and `%` are disabled and render as nothing. A channel gets at most \
3 autoresponses every 10 seconds.",
    ),
];

/// Jinja syntax topics, looked up by `ar tutorial <topic>`.
pub const TOPICS: [(&str, &str); 8] = [
    (
        "variables",
        "Print a variable with `{{ name }}`. Attributes are accessed with a dot or brackets: \
`{{ message.author.name }}` and `{{ message['content'] }}` are both valid. Undefined variables \
render as an empty string.",
    ),
    (
        "filters",
        "Filters transform a value and are applied with a pipe: `{{ message.content|upper }}`, \
`{{ author.name|replace('a', 'b') }}` or `{{ guild.name|default('no guild') }}`. Filters can be \
chained: `{{ message.content|lower|trim }}`.",
    ),
    (
        "if",
        "Conditionals choose what to render:\n```jinja\n{% if author.bot %}\nbeep boop\n\
{% elif author.nick %}\nhi {{ author.nick }}\n{% else %}\nhi {{ author.name }}\n{% endif %}\n```",
    ),
    (
        "for",
        "Loops repeat a block for every item of a sequence:\n```jinja\n\
{% for role in author.roles %}\n<@&{{ role }}>\n{% endfor %}\n```\nInside a loop, `loop.index` \
is the current iteration starting at 1.",
    ),
    (
        "set",
        "Assign a value to a name for the rest of the template:\n```jinja\n\
{% set greeting = 'Hello' %}\n{{ greeting }}, {{ author.name }}!\n```",
    ),
    (
        "comments",
        "Comments are written as `{# this is a comment #}` and are never rendered.",
    ),
    (
        "whitespace",
        "Block tags strip the newline that follows them. Add a `-` inside a tag to strip the \
whitespace before or after it: `{{- name -}}` and `{%- if x -%}`.",
    ),
    (
        "tests",
        "Tests check a value with `is`: `{% if guild is none %}`, `{% if author.nick is defined %}` \
or `{% if loop.index is even %}`.",
    ),
];

/// Looks up a topic by exact name, then by prefix, ignoring case.
pub fn find_topic(query: &str) -> Option<(&'static str, &'static str)> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return None;
    }

    TOPICS
        .iter()
        .find(|(name, _)| *name == query)
        .or_else(|| TOPICS.iter().find(|(name, _)| name.starts_with(&query)))
        .copied()
}

/// Footer listing the available topics.
pub fn topics_footer() -> String {
    let names: Vec<&str> = TOPICS.iter().map(|(name, _)| *name).collect();
    format!(
        "To get the syntax of a Jinja construct, use `ar tutorial <topic>`.\nAvailable topics: `{}`",
        names.join("`, `")
    )
}
