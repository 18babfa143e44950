mod completion_schema;
mod schema_extraction;

use proc_macro::TokenStream;

/// Attach a cached JSON schema to a response struct.
///
/// Generates a `trip_agent_rs::schema::CompletionSchema` impl whose handle is
/// built once from `schemars::schema_for!` and enriched with the struct and
/// field doc comments. Accepts optional `name = "..."` and
/// `description = "..."` overrides.
#[proc_macro_attribute]
pub fn completion_schema(attr: TokenStream, item: TokenStream) -> TokenStream {
    completion_schema::completion_schema(attr, item)
}
