extern crate proc_macro;

use proc_macro::TokenStream;

mod command;

/// Turn an `async fn(ctx, params...)` into a function returning a `CommandBuilder`.
///
/// ```ignore
/// /// Adds two numbers together
/// #[command]
/// async fn add(ctx: Arc<Context>, a: i64, #[default(1)] b: i64) -> Result<(), HandlerError> {
///     ctx.send(format!("{}", a + b), SendOptions::new()).await?;
///     Ok(())
/// }
/// ```
///
/// The command name defaults to the function name in kebab case and the help text comes from
/// doc comments. Parameter attributes: `#[default(expr)]` makes the parameter optional,
/// `#[hint("...")]` replaces the type hint used for option inference, e.g.
/// `#[hint("Range<1, 10>")] n: i64`.
#[proc_macro_attribute]
pub fn command(attr: TokenStream, item: TokenStream) -> TokenStream {
    command::expand(attr, item)
}
