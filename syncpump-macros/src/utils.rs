use proc_macro::{Delimiter, Group, TokenStream, TokenTree};

/// Splits a `TokenStream` into comma-separated arguments.
///
/// Commas nested inside groups belong to the group, so only top-level
/// commas separate arguments.
pub(crate) fn split_args(input: TokenStream) -> Vec<Vec<TokenTree>> {
    let mut args = Vec::new();
    let mut current = Vec::new();

    for token in input {
        match &token {
            TokenTree::Punct(p) if p.as_char() == ',' => {
                if !current.is_empty() {
                    args.push(current);
                    current = Vec::new();
                }
            }
            _ => current.push(token),
        }
    }

    if !current.is_empty() {
        args.push(current);
    }

    args
}

/// Parses a `key = "literal"` argument into its key and literal source.
pub(crate) fn parse_key_value(arg: &[TokenTree]) -> Option<(String, String)> {
    match arg {
        [TokenTree::Ident(key), TokenTree::Punct(eq), TokenTree::Literal(value)]
            if eq.as_char() == '=' =>
        {
            Some((key.to_string(), value.to_string()))
        }
        _ => None,
    }
}

/// Removes the `async` keyword from a function signature.
///
/// Returns `false` when the function was not `async`.
pub(crate) fn strip_async(tokens: &mut Vec<TokenTree>) -> bool {
    match tokens
        .iter()
        .position(|t| matches!(t, TokenTree::Ident(id) if id.to_string() == "async"))
    {
        Some(pos) => {
            tokens.remove(pos);
            true
        }
        None => false,
    }
}

/// Position of the function body, the last brace-delimited group.
pub(crate) fn body_position(tokens: &[TokenTree]) -> Option<usize> {
    tokens
        .iter()
        .rposition(|t| matches!(t, TokenTree::Group(g) if g.delimiter() == Delimiter::Brace))
}

/// Builds `{ let runner = <builder>; runner.block_on(async move <body>) }`.
///
/// The original body tokens are moved as-is so their spans survive.
pub(crate) fn wrap_body(builder: &str, body: TokenStream) -> TokenTree {
    let mut future: TokenStream = "async move".parse().unwrap();
    future.extend([TokenTree::Group(Group::new(Delimiter::Brace, body))]);

    let mut block: TokenStream = format!("let runner = {builder}; runner.block_on")
        .parse()
        .unwrap();
    block.extend([TokenTree::Group(Group::new(Delimiter::Parenthesis, future))]);

    TokenTree::Group(Group::new(Delimiter::Brace, block))
}

/// Emits a `compile_error!` with `message`.
pub(crate) fn compile_error(message: &str) -> TokenStream {
    format!("compile_error!({message:?});").parse().unwrap()
}
