//! Source rewrite that disables arithmetic operators inside template blocks.
//!
//! Responses are user supplied, so the power, multiplication, floor division and modulo
//! operators are not allowed to execute: `2 ** 100000` or `"x" * 10 ** 9` would otherwise
//! let a single message allocate unbounded memory. Every `left OP right` in a `{{ }}` or
//! `{% %}` block is replaced with a call to [`DISABLED_BINOP_FUNCTION`], which the
//! environment registers to return an undefined value. Template text, comments, raw blocks
//! and string literals are left untouched.

/// Name of the function every disabled operation is rewritten to.
pub const DISABLED_BINOP_FUNCTION: &str = "__disabled_binop";

/// Bound tighter than the multiplicative operators, so rewritten first.
const POWER_OPERATORS: [&str; 1] = ["**"];
const MULTIPLICATIVE_OPERATORS: [&str; 3] = ["*", "//", "%"];

/// Multi-character operators recognised by the tokenizer, longest first.
const COMPOUND_OPERATORS: [&str; 6] = ["**", "//", "==", "!=", "<=", ">="];

const KEYWORDS: [&str; 7] = ["and", "or", "not", "in", "is", "if", "else"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Space,
    Ident,
    Number,
    Str,
    Op,
    Open,
    Close,
    Dot,
    Pipe,
    /// An already rewritten operation, treated as a single primary expression.
    Rewritten,
}

#[derive(Debug, Clone)]
struct Token {
    kind: Kind,
    text: String,
}

impl Token {
    fn is_op(&self, op: &str) -> bool {
        self.kind == Kind::Op && self.text == op
    }

    fn is_keyword(&self) -> bool {
        self.kind == Kind::Ident && KEYWORDS.contains(&self.text.as_str())
    }

    /// Whether this token can be the last token of an operand.
    fn ends_operand(&self) -> bool {
        match self.kind {
            Kind::Ident => !self.is_keyword(),
            Kind::Number | Kind::Str | Kind::Close | Kind::Rewritten => true,
            _ => false,
        }
    }
}

/// Rewrites every disabled binary operation in `source`.
///
/// # Arguments
/// - `source` - Template source as written by the user
///
/// # Returns
/// - `String` - Source with each disabled operation replaced by a call to
///   [`DISABLED_BINOP_FUNCTION`]; unchanged if no block contains one
pub fn disable_operators(source: &str) -> String {
    let mut output = String::with_capacity(source.len());
    let mut rest = source;

    while let Some(start) = find_block_start(rest) {
        let (text, block) = rest.split_at(start);
        output.push_str(text);

        let opener = &block[..2];
        if opener == "{#" {
            let end = block.find("#}").map_or(block.len(), |end| end + 2);
            output.push_str(&block[..end]);
            rest = &block[end..];
            continue;
        }

        let closer = if opener == "{{" { "}}" } else { "%}" };
        let body_end = find_block_end(&block[2..], closer).map_or(block.len(), |end| end + 2);
        let body = &block[2..body_end];
        let block_end = (body_end + closer.len()).min(block.len());

        output.push_str(opener);
        output.push_str(&rewrite_body(body));
        output.push_str(&block[body_end..block_end]);
        rest = &block[block_end..];

        if opener == "{%" && is_raw_tag(body) {
            let raw_end = find_endraw(rest).unwrap_or(rest.len());
            output.push_str(&rest[..raw_end]);
            rest = &rest[raw_end..];
        }
    }

    output.push_str(rest);
    output
}

fn find_block_start(text: &str) -> Option<usize> {
    text.match_indices('{')
        .map(|(index, _)| index)
        .find(|&index| matches!(text.as_bytes().get(index + 1), Some(b'{' | b'%' | b'#')))
}

/// Finds the closing delimiter of a block, skipping string literals and nested brackets.
fn find_block_end(body: &str, closer: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut pos = 0;

    while pos < body.len() {
        let rest = &body[pos..];
        if depth == 0 && rest.starts_with(closer) {
            return Some(pos);
        }

        let c = rest.chars().next()?;
        pos += match c {
            '"' | '\'' => scan_string(rest, c),
            '(' | '[' | '{' => {
                depth += 1;
                1
            }
            ')' | ']' | '}' => {
                depth = depth.saturating_sub(1);
                1
            }
            _ => c.len_utf8(),
        };
    }

    None
}

fn is_raw_tag(body: &str) -> bool {
    body.trim_matches(|c: char| c == '-' || c == '+' || c.is_whitespace()) == "raw"
}

fn find_endraw(text: &str) -> Option<usize> {
    text.match_indices("{%").map(|(index, _)| index).find(|&index| {
        let tag = &text[index + 2..];
        let tag = tag.strip_prefix(['-', '+']).unwrap_or(tag);
        tag.trim_start().starts_with("endraw")
    })
}

/// Rewrites the inside of one block, keeping whitespace control markers in place.
fn rewrite_body(body: &str) -> String {
    let prefix_len = usize::from(body.starts_with(['-', '+']));
    let suffix_len = usize::from(body.len() > prefix_len && body.ends_with(['-', '+']));
    let (prefix, rest) = body.split_at(prefix_len);
    let (expression, suffix) = rest.split_at(rest.len() - suffix_len);

    let tokens = tokenize(expression);
    let has_disabled = tokens.iter().any(|token| {
        token.kind == Kind::Op
            && (POWER_OPERATORS.contains(&token.text.as_str())
                || MULTIPLICATIVE_OPERATORS.contains(&token.text.as_str()))
    });
    if !has_disabled {
        return body.to_string();
    }

    let tokens = rewrite_operators(tokens, &POWER_OPERATORS, false);
    let tokens = rewrite_operators(tokens, &MULTIPLICATIVE_OPERATORS, true);

    let mut output = String::with_capacity(body.len());
    output.push_str(prefix);
    for token in &tokens {
        output.push_str(&token.text);
    }
    output.push_str(suffix);
    output
}

/// Replaces `left OP right` for each operator of one precedence level, left to right.
///
/// `through_division` extends the left operand over `/`, which shares the multiplicative
/// precedence level but stays enabled, so `a / b * c` is rewritten as a whole.
fn rewrite_operators(
    mut tokens: Vec<Token>,
    operators: &[&str],
    through_division: bool,
) -> Vec<Token> {
    let mut index = 0;

    while index < tokens.len() {
        let token = &tokens[index];
        if token.kind == Kind::Op && operators.contains(&token.text.as_str()) {
            let start = left_operand_start(&tokens, index, through_division);
            let end = right_operand_end(&tokens, index);

            if let (Some(start), Some(end)) = (start, end) {
                let replacement = Token {
                    kind: Kind::Rewritten,
                    text: format!("{}(\"{}\")", DISABLED_BINOP_FUNCTION, token.text),
                };
                tokens.splice(start..=end, [replacement]);
                index = start + 1;
                continue;
            }
        }
        index += 1;
    }

    tokens
}

fn left_operand_start(tokens: &[Token], operator: usize, through_division: bool) -> Option<usize> {
    let mut start = unary_start(tokens, operator)?;

    if through_division {
        while let Some(previous) = previous_significant(tokens, start) {
            if !tokens[previous].is_op("/") {
                break;
            }
            match unary_start(tokens, previous) {
                Some(operand) => start = operand,
                None => break,
            }
        }
    }

    Some(start)
}

/// Start of the unary expression ending right before `before`.
fn unary_start(tokens: &[Token], before: usize) -> Option<usize> {
    let last = previous_significant(tokens, before)?;
    let mut start = primary_start(tokens, last)?;

    // Postfix chain: attribute access, filters, calls and subscripts.
    while let Some(previous) = previous_significant(tokens, start) {
        let token = &tokens[previous];
        match token.kind {
            Kind::Dot | Kind::Pipe => {
                let Some(owner) = previous_significant(tokens, previous) else {
                    break;
                };
                match primary_start(tokens, owner) {
                    Some(owner_start) => start = owner_start,
                    None => break,
                }
            }
            _ if tokens[start].kind == Kind::Open
                && tokens[start].text != "{"
                && token.ends_operand() =>
            {
                match primary_start(tokens, previous) {
                    Some(callee_start) => start = callee_start,
                    None => break,
                }
            }
            _ => break,
        }
    }

    while let Some(previous) = previous_significant(tokens, start) {
        let token = &tokens[previous];
        let is_sign = token.is_op("-") || token.is_op("+");
        let is_unary = previous_significant(tokens, previous)
            .map_or(true, |before_sign| !tokens[before_sign].ends_operand());
        if !(is_sign && is_unary) {
            break;
        }
        start = previous;
    }

    Some(start)
}

fn right_operand_end(tokens: &[Token], operator: usize) -> Option<usize> {
    let mut first = next_significant(tokens, operator)?;
    while tokens[first].is_op("-") || tokens[first].is_op("+") {
        first = next_significant(tokens, first)?;
    }

    let mut end = primary_end(tokens, first)?;

    while let Some(next) = next_significant(tokens, end) {
        match tokens[next].kind {
            Kind::Dot | Kind::Pipe => {
                let Some(name) = next_significant(tokens, next) else {
                    break;
                };
                if !matches!(tokens[name].kind, Kind::Ident | Kind::Number) {
                    break;
                }
                end = name;
            }
            Kind::Open if tokens[next].text != "{" => end = matching_close(tokens, next)?,
            _ => break,
        }
    }

    Some(end)
}

/// Start of the primary expression whose last token is at `last`.
fn primary_start(tokens: &[Token], last: usize) -> Option<usize> {
    let token = &tokens[last];
    match token.kind {
        Kind::Close => matching_open(tokens, last),
        _ if token.ends_operand() => Some(last),
        _ => None,
    }
}

/// End of the primary expression whose first token is at `first`.
fn primary_end(tokens: &[Token], first: usize) -> Option<usize> {
    let token = &tokens[first];
    match token.kind {
        Kind::Open => matching_close(tokens, first),
        Kind::Ident if token.is_keyword() => None,
        Kind::Ident | Kind::Number | Kind::Str | Kind::Rewritten => Some(first),
        _ => None,
    }
}

fn matching_close(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (index, token) in tokens.iter().enumerate().skip(open) {
        match token.kind {
            Kind::Open => depth += 1,
            Kind::Close => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

fn matching_open(tokens: &[Token], close: usize) -> Option<usize> {
    let mut depth = 0usize;
    for index in (0..=close).rev() {
        match tokens[index].kind {
            Kind::Close => depth += 1,
            Kind::Open => {
                depth -= 1;
                if depth == 0 {
                    return Some(index);
                }
            }
            _ => {}
        }
    }
    None
}

fn previous_significant(tokens: &[Token], before: usize) -> Option<usize> {
    (0..before).rev().find(|&index| tokens[index].kind != Kind::Space)
}

fn next_significant(tokens: &[Token], after: usize) -> Option<usize> {
    (after + 1..tokens.len()).find(|&index| tokens[index].kind != Kind::Space)
}

fn tokenize(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(c) = source[pos..].chars().next() {
        let rest = &source[pos..];
        let (kind, len) = if c.is_whitespace() {
            (Kind::Space, scan_while(rest, char::is_whitespace))
        } else if c == '"' || c == '\'' {
            (Kind::Str, scan_string(rest, c))
        } else if c.is_ascii_digit() {
            (Kind::Number, scan_number(rest))
        } else if c.is_alphabetic() || c == '_' {
            (
                Kind::Ident,
                scan_while(rest, |c| c.is_alphanumeric() || c == '_'),
            )
        } else if let Some(op) = COMPOUND_OPERATORS.iter().find(|op| rest.starts_with(**op)) {
            (Kind::Op, op.len())
        } else {
            let kind = match c {
                '(' | '[' | '{' => Kind::Open,
                ')' | ']' | '}' => Kind::Close,
                '.' => Kind::Dot,
                '|' => Kind::Pipe,
                _ => Kind::Op,
            };
            (kind, c.len_utf8())
        };

        tokens.push(Token {
            kind,
            text: rest[..len].to_string(),
        });
        pos += len;
    }

    tokens
}

fn scan_while(text: &str, predicate: impl Fn(char) -> bool) -> usize {
    text.char_indices()
        .find(|&(_, c)| !predicate(c))
        .map_or(text.len(), |(index, _)| index)
}

/// Length of the string literal at the start of `text`, including both quotes.
fn scan_string(text: &str, quote: char) -> usize {
    let mut escaped = false;
    for (index, c) in text.char_indices().skip(1) {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == quote {
            return index + c.len_utf8();
        }
    }
    text.len()
}

fn scan_number(text: &str) -> usize {
    let bytes = text.as_bytes();
    let mut end = 0;
    while end < bytes.len() {
        let byte = bytes[end];
        let is_fraction =
            byte == b'.' && bytes.get(end + 1).is_some_and(|next| next.is_ascii_digit());
        if byte.is_ascii_alphanumeric() || byte == b'_' || is_fraction {
            end += 1;
        } else {
            break;
        }
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;

    fn disabled(op: &str) -> String {
        format!("{}(\"{}\")", DISABLED_BINOP_FUNCTION, op)
    }

    #[test]
    fn leaves_plain_templates_untouched() {
        let source = "Hello {{ author.name|upper }}! {% if guild %}{{ guild.name ~ '!' }}{% endif %}";

        assert_eq!(disable_operators(source), source);
    }

    #[test]
    fn rewrites_power() {
        assert_eq!(
            disable_operators("{{ 2 ** 3 }}"),
            format!("{{{{ {} }}}}", disabled("**"))
        );
    }

    #[test]
    fn rewrites_chained_multiplicative_operators_as_one_operation() {
        assert_eq!(
            disable_operators("{{ a * b % c }}"),
            format!("{{{{ {} }}}}", disabled("%"))
        );
    }

    #[test]
    fn division_is_folded_into_the_left_operand() {
        assert_eq!(
            disable_operators("{{ 10 / 2 * 3 }}"),
            format!("{{{{ {} }}}}", disabled("*"))
        );
    }

    #[test]
    fn lower_precedence_operators_are_kept() {
        assert_eq!(
            disable_operators("{{ 1 - 2 * 3 }}"),
            format!("{{{{ 1 - {} }}}}", disabled("*"))
        );
    }

    #[test]
    fn operands_include_postfix_chains_and_signs() {
        assert_eq!(
            disable_operators("{{ -message.author.id * items[0]|abs }}"),
            format!("{{{{ {} }}}}", disabled("*"))
        );
    }

    #[test]
    fn rewrites_inside_statements() {
        assert_eq!(
            disable_operators("{% set total = price * qty %}{{ total }}"),
            format!("{{% set total = {} %}}{{{{ total }}}}", disabled("*"))
        );
    }

    #[test]
    fn keeps_whitespace_control_markers() {
        assert_eq!(
            disable_operators("{{- 2 // 3 -}}"),
            format!("{{{{- {} -}}}}", disabled("//"))
        );
    }

    #[test]
    fn ignores_strings_comments_and_raw_blocks() {
        let source = "{{ \"2 * 3\" }}{# 2 ** 3 #}{% raw %}{{ 4 % 2 }}{% endraw %}";

        assert_eq!(disable_operators(source), source);
    }

    #[test]
    fn leaves_argument_unpacking_alone() {
        let source = "{{ dict(**values) }}";

        assert_eq!(disable_operators(source), source);
    }
}
