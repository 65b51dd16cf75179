//! Process-wide protocol schema.
//!
//! The schema is loaded exactly once at process startup through [`init`],
//! which decodes the descriptor set compiled from the bundled `.proto` and
//! checks it against the generated code: every method must have the expected
//! signature and every message must encode with the field numbers the
//! descriptor declares. Request handlers only ever read the initialised
//! descriptor via [`get`]; nothing loads the schema lazily.

use std::sync::OnceLock;

use prost::bytes::Buf;
use prost::encoding::{decode_key, skip_field, DecodeContext};
use prost::Message;
use prost_types::FileDescriptorSet;

use crate::proto::{
    ImageRequest, ImageResponse, ImageResult, ImagesRequest, ImagesResponse, FILE_DESCRIPTOR_SET,
};

pub const PACKAGE: &str = "imageclassifier";
pub const SERVICE: &str = "ImageClassifier";

/// (route name, request message, response message) for every compiled method.
const COMPILED_METHODS: [(&str, &str, &str); 2] = [
    ("UploadImage", "ImageRequest", "ImageResponse"),
    ("UploadImages", "ImagesRequest", "ImagesResponse"),
];

static SCHEMA: OnceLock<ServiceSchema> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("Schema not initialised; call schema::init() at startup")]
    NotInitialized,
    #[error("Schema descriptor could not be decoded: {0}")]
    Decode(#[from] prost::DecodeError),
    #[error("Schema declares package '{0}', expected 'imageclassifier'")]
    PackageMismatch(String),
    #[error("Schema does not declare service 'ImageClassifier'")]
    MissingService,
    #[error("Schema method mismatch: {0}")]
    MethodMismatch(String),
    #[error("Schema message mismatch: {0}")]
    MessageMismatch(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub name: String,
    pub request: String,
    pub response: String,
}

impl MethodDescriptor {
    /// Full HTTP/2 path used on the wire, e.g. `/imageclassifier.ImageClassifier/UploadImage`.
    pub fn path(&self) -> String {
        format!("/{}.{}/{}", PACKAGE, SERVICE, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageDescriptor {
    pub name: String,
    /// (field name, field number) in declaration order
    pub fields: Vec<(String, u32)>,
}

#[derive(Debug, Clone)]
pub struct ServiceSchema {
    pub package: String,
    pub service: String,
    pub methods: Vec<MethodDescriptor>,
    pub messages: Vec<MessageDescriptor>,
}

impl ServiceSchema {
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().find(|m| m.name == name)
    }

    pub fn message(&self, name: &str) -> Option<&MessageDescriptor> {
        self.messages.iter().find(|m| m.name == name)
    }

    pub fn full_service_name(&self) -> String {
        format!("{}.{}", self.package, self.service)
    }
}

/// Loads and validates the schema. Safe to call more than once; only the
/// first successful call does any work.
pub fn init() -> Result<&'static ServiceSchema, SchemaError> {
    if let Some(schema) = SCHEMA.get() {
        return Ok(schema);
    }
    let descriptors = FileDescriptorSet::decode(FILE_DESCRIPTOR_SET)?;
    let schema = from_descriptor_set(&descriptors)?;
    validate(&schema)?;
    Ok(SCHEMA.get_or_init(|| schema))
}

pub fn get() -> Result<&'static ServiceSchema, SchemaError> {
    SCHEMA.get().ok_or(SchemaError::NotInitialized)
}

/// Status for a method the schema declares but the serving process never
/// registered a handler for.
pub fn unregistered(method: &str) -> tonic::Status {
    match get().ok().and_then(|schema| schema.method(method)) {
        Some(declared) => tonic::Status::unimplemented(format!(
            "Method {} is not registered by this server",
            declared.path()
        )),
        None => tonic::Status::unimplemented(format!(
            "Method /{}.{}/{} is not part of the schema",
            PACKAGE, SERVICE, method
        )),
    }
}

fn from_descriptor_set(descriptors: &FileDescriptorSet) -> Result<ServiceSchema, SchemaError> {
    let file = descriptors
        .file
        .iter()
        .find(|file| file.package() == PACKAGE)
        .ok_or_else(|| {
            let found = descriptors
                .file
                .first()
                .map(|file| file.package().to_string())
                .unwrap_or_default();
            SchemaError::PackageMismatch(found)
        })?;

    let service = file
        .service
        .iter()
        .find(|service| service.name() == SERVICE)
        .ok_or(SchemaError::MissingService)?;

    let prefix = format!(".{}.", PACKAGE);
    let local = |type_name: &str| {
        type_name
            .strip_prefix(prefix.as_str())
            .unwrap_or(type_name)
            .to_string()
    };

    let methods = service
        .method
        .iter()
        .map(|method| MethodDescriptor {
            name: method.name().to_string(),
            request: local(method.input_type()),
            response: local(method.output_type()),
        })
        .collect();

    let messages = file
        .message_type
        .iter()
        .map(|message| MessageDescriptor {
            name: message.name().to_string(),
            fields: message
                .field
                .iter()
                .map(|field| (field.name().to_string(), u32::try_from(field.number()).unwrap_or(0)))
                .collect(),
        })
        .collect();

    Ok(ServiceSchema {
        package: file.package().to_string(),
        service: service.name().to_string(),
        methods,
        messages,
    })
}

fn validate(schema: &ServiceSchema) -> Result<(), SchemaError> {
    if schema.methods.len() != COMPILED_METHODS.len() {
        return Err(SchemaError::MethodMismatch(format!(
            "schema declares {} methods, {} are compiled",
            schema.methods.len(),
            COMPILED_METHODS.len()
        )));
    }
    for (name, request, response) in COMPILED_METHODS {
        let method = schema
            .method(name)
            .ok_or_else(|| SchemaError::MethodMismatch(format!("{} is not declared", name)))?;
        if method.request != request || method.response != response {
            return Err(SchemaError::MethodMismatch(format!(
                "{} declared as ({}) -> ({}), compiled as ({}) -> ({})",
                name, method.request, method.response, request, response
            )));
        }
    }

    check_layout(schema, "ImageRequest", &sample_image_request())?;
    check_layout(schema, "ImageResponse", &sample_image_response())?;
    check_layout(schema, "ImagesRequest", &ImagesRequest {
        images: vec![ImageRequest::default()],
    })?;
    check_layout(schema, "ImageResult", &ImageResult::from_response(
        "a",
        sample_image_response(),
    ))?;
    check_layout(schema, "ImagesResponse", &ImagesResponse {
        results: vec![ImageResult::default()],
    })?;
    Ok(())
}

fn sample_image_request() -> ImageRequest {
    ImageRequest {
        image_data: vec![1],
        filename: "a".to_string(),
    }
}

fn sample_image_response() -> ImageResponse {
    ImageResponse {
        label: "cat".to_string(),
        confidence: 0.5,
        model_latency_ms: 1,
    }
}

/// `sample` must set every field; its encoding then carries exactly the
/// declared field numbers in ascending order.
fn check_layout<M: Message>(schema: &ServiceSchema, name: &str, sample: &M) -> Result<(), SchemaError> {
    let message = schema
        .message(name)
        .ok_or_else(|| SchemaError::MessageMismatch(format!("{} is not declared", name)))?;
    let mut declared: Vec<u32> = message.fields.iter().map(|(_, number)| *number).collect();
    declared.sort_unstable();

    let encoded = encoded_field_numbers(&sample.encode_to_vec())?;
    if encoded != declared {
        return Err(SchemaError::MessageMismatch(format!(
            "{} declares fields {:?}, compiled code encodes {:?}",
            name, declared, encoded
        )));
    }
    Ok(())
}

fn encoded_field_numbers(mut buf: &[u8]) -> Result<Vec<u32>, SchemaError> {
    let mut numbers = Vec::new();
    while buf.has_remaining() {
        let (tag, wire_type) = decode_key(&mut buf)?;
        skip_field(wire_type, tag, &mut buf, DecodeContext::default())?;
        numbers.push(tag);
    }
    Ok(numbers)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundled() -> FileDescriptorSet {
        FileDescriptorSet::decode(FILE_DESCRIPTOR_SET).unwrap()
    }

    #[test]
    fn test_init_is_idempotent() {
        let first = init().unwrap();
        let second = init().unwrap();
        assert!(std::ptr::eq(first, second));
        assert!(std::ptr::eq(first, get().unwrap()));
    }

    #[test]
    fn test_bundled_schema_declares_both_methods() {
        let schema = init().unwrap();
        assert_eq!(schema.full_service_name(), "imageclassifier.ImageClassifier");
        assert_eq!(
            schema.method("UploadImage").unwrap().path(),
            "/imageclassifier.ImageClassifier/UploadImage"
        );
        assert_eq!(schema.method("UploadImages").unwrap().request, "ImagesRequest");
        assert_eq!(
            schema.message("ImageResponse").unwrap().fields,
            vec![
                ("label".to_string(), 1),
                ("confidence".to_string(), 2),
                ("modelLatencyMs".to_string(), 3),
            ]
        );
    }

    #[test]
    fn test_unregistered_status() {
        init().unwrap();
        let status = unregistered("UploadImages");
        assert_eq!(status.code(), tonic::Code::Unimplemented);
        assert!(status.message().contains("/imageclassifier.ImageClassifier/UploadImages"));
        assert!(status.message().contains("not registered"));
    }

    #[test]
    fn test_rejects_foreign_package() {
        let mut descriptors = bundled();
        descriptors.file[0].package = Some("other".to_string());
        assert!(matches!(
            from_descriptor_set(&descriptors),
            Err(SchemaError::PackageMismatch(p)) if p == "other"
        ));
    }

    #[test]
    fn test_rejects_signature_drift() {
        let mut descriptors = bundled();
        descriptors.file[0].service[0].method[0].output_type =
            Some(".imageclassifier.ImagesResponse".to_string());
        let schema = from_descriptor_set(&descriptors).unwrap();
        assert!(matches!(validate(&schema), Err(SchemaError::MethodMismatch(_))));
    }

    #[test]
    fn test_rejects_field_number_drift() {
        let mut descriptors = bundled();
        let response = descriptors.file[0]
            .message_type
            .iter_mut()
            .find(|m| m.name() == "ImageResponse")
            .unwrap();
        let latency = response
            .field
            .iter_mut()
            .find(|f| f.name() == "modelLatencyMs")
            .unwrap();
        latency.number = Some(4);

        let schema = from_descriptor_set(&descriptors).unwrap();
        let err = validate(&schema).unwrap_err();
        assert!(matches!(&err, SchemaError::MessageMismatch(m) if m.starts_with("ImageResponse")));
    }

    #[test]
    fn test_encoded_field_numbers() {
        let numbers = encoded_field_numbers(&sample_image_response().encode_to_vec()).unwrap();
        assert_eq!(numbers, vec![1, 2, 3]);
    }
}
