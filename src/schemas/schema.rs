use schemars::schema::{ObjectValidation, RootSchema, Schema, SchemaObject};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{any::TypeId, sync::Arc};

/// Cached JSON schema for a response type, cheap to clone.
#[derive(Clone, Debug)]
pub struct SchemaHandle {
    schema_name: &'static str,
    type_name: &'static str,
    type_id: TypeId,
    schema_json: Arc<Value>,
}

impl SchemaHandle {
    pub fn from_root_schema<T: 'static>(
        schema_name: &'static str,
        type_name: &'static str,
        root: RootSchema,
    ) -> Self {
        let schema_json = serde_json::to_value(root)
            .unwrap_or_else(|err| panic!("failed to serialize schema for {}: {}", type_name, err));

        Self {
            schema_name,
            type_name,
            type_id: TypeId::of::<T>(),
            schema_json: Arc::new(schema_json),
        }
    }

    pub fn schema_name(&self) -> &'static str {
        self.schema_name
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn schema_json(&self) -> &Value {
        self.schema_json.as_ref()
    }
}

/// Implemented by `#[completion_schema]` structs.
pub trait CompletionSchema: DeserializeOwned + Send + Sync + 'static {
    fn schema() -> &'static SchemaHandle;
}

/// Copy the macro's name and doc comments into the generated schema metadata.
///
/// The schema name always becomes the title; field docs only fill gaps.
pub fn apply_doc_comments(
    root: &mut RootSchema,
    title: &'static str,
    description: Option<&'static str>,
    field_docs: &[(&'static str, &'static str)],
) {
    let schema_object = &mut root.schema;
    apply_struct_metadata(schema_object, title, description);

    if let Some(object_validation) = schema_object.object.as_mut() {
        apply_field_metadata(object_validation.as_mut(), field_docs);
    }
}

fn apply_struct_metadata(
    schema_object: &mut SchemaObject,
    title: &'static str,
    description: Option<&'static str>,
) {
    let metadata = schema_object.metadata();
    metadata.title = Some(title.to_string());

    if let Some(description) = description {
        metadata.description = Some(description.to_string());
    }
}

fn apply_field_metadata(
    object_validation: &mut ObjectValidation,
    field_docs: &[(&'static str, &'static str)],
) {
    for (field, doc) in field_docs {
        if let Some(Schema::Object(field_object)) = object_validation.properties.get_mut(*field) {
            field_object
                .metadata()
                .description
                .get_or_insert_with(|| (*doc).to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion_schema;
    use schemars::JsonSchema;
    use serde::Deserialize;

    /// A stop on the route
    #[derive(Debug, Deserialize, JsonSchema)]
    #[completion_schema(name = "route_stop")]
    struct RouteStop {
        /// Display name of the stop
        name: String,
        minutes: u32,
    }

    #[test]
    fn test_handle_is_cached_and_named() {
        let first = RouteStop::schema();
        let second = RouteStop::schema();

        assert!(std::ptr::eq(first, second));
        assert_eq!(first.schema_name(), "route_stop");
        assert_eq!(first.type_name(), "RouteStop");
        assert_eq!(first.type_id(), TypeId::of::<RouteStop>());
    }

    #[test]
    fn test_doc_comments_land_in_schema() {
        let schema = RouteStop::schema().schema_json();

        assert_eq!(schema["title"], "route_stop");
        assert_eq!(schema["description"], "A stop on the route");
        assert_eq!(
            schema["properties"]["name"]["description"],
            "Display name of the stop"
        );
        let minutes = &schema["properties"]["minutes"];
        assert!(minutes.get("description").is_none());
    }
}
