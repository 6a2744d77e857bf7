mod utils;

use proc_macro::{TokenStream, TokenTree};

/// Runs an `async fn main` on a syncpump pump.
///
/// ```rust,ignore
/// #[syncpump::main(name = "cli")]
/// async fn main() -> Result<(), AppError> {
///     run().await
/// }
/// ```
///
/// The only supported argument is `name`, the label of the pump's tracing
/// span.
#[proc_macro_attribute]
pub fn main(attr: TokenStream, item: TokenStream) -> TokenStream {
    let mut builder = String::from("::syncpump::Builder::new()");

    for arg in utils::split_args(attr) {
        match utils::parse_key_value(&arg) {
            Some((key, value)) if key == "name" => {
                builder.push_str(&format!(".name({value})"));
            }
            _ => {
                return utils::compile_error(
                    "unsupported argument to #[syncpump::main]; expected `name = \"...\"`",
                );
            }
        }
    }

    builder.push_str(".build()");

    wrap_fn(item, &builder, "#[syncpump::main]").unwrap_or_else(|err| err)
}

/// Runs an `async fn` test on a syncpump pump.
///
/// ```rust,ignore
/// #[syncpump::test]
/// async fn sleeps() {
///     syncpump::time::sleep(Duration::from_millis(5)).await;
/// }
/// ```
#[proc_macro_attribute]
pub fn test(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let builder = "::syncpump::Builder::new().name(\"test\").build()";

    match wrap_fn(item, builder, "#[syncpump::test]") {
        Ok(function) => {
            let mut result: TokenStream = "#[::core::prelude::v1::test]".parse().unwrap();
            result.extend(function);
            result
        }
        Err(err) => err,
    }
}

/// Turns `async fn f() { body }` into a synchronous `fn` whose body runs
/// on a pump built by `builder`.
fn wrap_fn(item: TokenStream, builder: &str, attribute: &str) -> Result<TokenStream, TokenStream> {
    let mut tokens: Vec<TokenTree> = item.into_iter().collect();

    if !utils::strip_async(&mut tokens) {
        return Err(utils::compile_error(&format!(
            "{attribute} can only be applied to an `async fn`"
        )));
    }

    let Some(pos) = utils::body_position(&tokens) else {
        return Err(utils::compile_error(&format!(
            "{attribute} expects a function with a body"
        )));
    };

    let body = match &tokens[pos] {
        TokenTree::Group(g) => g.stream(),
        _ => unreachable!(),
    };

    tokens[pos] = utils::wrap_body(builder, body);

    Ok(tokens.into_iter().collect())
}
