mod route;

use proc_macro::TokenStream;

/// Generates an `OpenAPI` documentation function for a handler, named after
/// the handler with a `_docs` suffix.
///
/// The first line of the handler's doc comment becomes the operation summary
/// and the remaining lines become its description.
///
/// ```ignore
/// /// Get campaign
/// /// Returns a single campaign by its unique id.
/// #[route(tag = tag::CAMPAIGN, response(status = 404, description = "Unknown campaign."))]
/// pub async fn get_campaign(/* ... */) {}
/// ```
#[proc_macro_attribute]
pub fn route(args: TokenStream, input: TokenStream) -> TokenStream {
	route::from_input(args, input)
}
