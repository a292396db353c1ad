mod document;

use proc_macro::TokenStream;

// ============================================================================
// #[derive(Document)] derive macro
// ============================================================================

/// Derive macro for the `Document` trait.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, Document)]
/// #[document(collection = "brands")]
/// struct Brand {
///     pub id: Option<String>,
///     pub name: String,
///     #[document(image)]
///     pub logo: Option<String>,
/// }
/// ```
///
/// - `#[document(collection = "...")]` sets the collection name.
///   If omitted, defaults to snake_case struct name + "s".
/// - `#[document(validate = "path::to::fn")]` routes `Document::validate`
///   to a `fn(&Self) -> Result<(), String>`.
/// - `#[document(id)]`, `#[document(name)]` and `#[document(image)]` mark the
///   identifier, display name and asset reference fields. When omitted they
///   default to fields named `id`, `name` and `image_ref`.
///
/// The id and image fields must be `Option<String>`; the name field must
/// dereference to `str`.
#[proc_macro_derive(Document, attributes(document))]
pub fn derive_document(input: TokenStream) -> TokenStream {
    document::derive_document(input)
}
