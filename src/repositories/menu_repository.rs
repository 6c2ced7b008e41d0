use async_trait::async_trait;
use aws_sdk_dynamodb::error::{DisplayErrorContext, SdkError};
use aws_sdk_dynamodb::operation::scan::ScanError;
use aws_sdk_dynamodb::operation::RequestId;
use aws_sdk_dynamodb::types::{AttributeValue, Select};
use aws_sdk_dynamodb::Client as DynamoDbClient;
use serde_json::{Map, Number, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn, Instrument};

use crate::models::{MenuDocument, RepositoryError, RepositoryResult};

/// Read access to the document store holding mess menus
#[async_trait]
pub trait MenuRepository: Send + Sync {
    /// Read every document of a collection. A collection with no documents,
    /// or one that does not exist, yields an empty vector.
    async fn fetch_collection(&self, collection: &str) -> RepositoryResult<Vec<MenuDocument>>;

    /// Physical name of the store object backing a collection
    fn table_name(&self, collection: &str) -> String {
        collection.to_string()
    }
}

/// DynamoDB implementation: one table per collection, one item per document
pub struct DynamoDbMenuRepository {
    client: Arc<DynamoDbClient>,
    table_prefix: String,
    id_attribute: String,
    region: String,
}

impl DynamoDbMenuRepository {
    pub fn new(
        client: Arc<DynamoDbClient>,
        table_prefix: String,
        id_attribute: String,
        region: String,
    ) -> Self {
        Self {
            client,
            table_prefix,
            id_attribute,
            region,
        }
    }

    /// Create a DynamoDB client span with X-Ray friendly attributes
    fn create_dynamodb_span(&self, operation: &str, table_name: &str) -> tracing::Span {
        tracing::info_span!(
            "DynamoDB",
            "aws.service" = "DynamoDB",
            "aws.operation" = operation,
            "aws.region" = %self.region,
            "aws.dynamodb.table_name" = %table_name,
            "aws.request_id" = tracing::field::Empty,
            "aws.remote.service" = "AWS::DynamoDB",
            "aws.remote.operation" = operation,
            "aws.remote.resource.type" = "AWS::DynamoDB::Table",
            "aws.remote.resource.identifier" = %table_name,
            "otel.kind" = "client",
            "otel.name" = format!("DynamoDB.{}", operation),
            "rpc.system" = "aws-api",
            "rpc.service" = "AmazonDynamoDBv2",
            "rpc.method" = operation,
            "db.system" = "dynamodb",
            "db.name" = %table_name,
            "db.operation" = operation,
            "items_read" = tracing::field::Empty,
        )
    }
}

#[async_trait]
impl MenuRepository for DynamoDbMenuRepository {
    fn table_name(&self, collection: &str) -> String {
        format!("{}{}", self.table_prefix, collection)
    }

    #[instrument(skip(self), fields(collection = %collection))]
    async fn fetch_collection(&self, collection: &str) -> RepositoryResult<Vec<MenuDocument>> {
        let table_name = self.table_name(collection);
        let scan_span = self.create_dynamodb_span("Scan", &table_name);

        async {
            let mut documents = Vec::new();
            let mut exclusive_start_key = None;

            // Scan pages are capped at 1MB, keep going until no LastEvaluatedKey is returned.
            loop {
                let result = self
                    .client
                    .scan()
                    .table_name(&table_name)
                    .select(Select::AllAttributes)
                    .set_exclusive_start_key(exclusive_start_key.take())
                    .send()
                    .await;

                let output = match result {
                    Ok(output) => output,
                    Err(e) if is_table_missing(&e) => {
                        warn!(table = %table_name, "Table not found, treating as empty collection");
                        return Ok(Vec::new());
                    }
                    Err(e) => {
                        let message = DisplayErrorContext(&e).to_string();
                        debug!(table = %table_name, error = %message, "DynamoDB Scan failed");
                        return Err(RepositoryError::AwsSdk { message });
                    }
                };

                if let Some(request_id) = output.request_id() {
                    tracing::Span::current().record("aws.request_id", request_id);
                }

                for item in output.items.unwrap_or_default() {
                    documents.push(item_to_document(collection, &self.id_attribute, item)?);
                }

                match output.last_evaluated_key {
                    Some(key) if !key.is_empty() => exclusive_start_key = Some(key),
                    _ => break,
                }
            }

            tracing::Span::current().record("items_read", documents.len());
            info!("Read {} documents from {}", documents.len(), table_name);
            Ok(documents)
        }
        .instrument(scan_span)
        .await
    }
}

fn is_table_missing<R>(error: &SdkError<ScanError, R>) -> bool {
    error
        .as_service_error()
        .map(ScanError::is_resource_not_found_exception)
        .unwrap_or(false)
}

/// Split a DynamoDB item into document id and data.
///
/// The id attribute must be a string; every other attribute becomes a field
/// of the data object.
pub fn item_to_document(
    collection: &str,
    id_attribute: &str,
    mut item: HashMap<String, AttributeValue>,
) -> RepositoryResult<MenuDocument> {
    let id = match item.remove(id_attribute) {
        Some(AttributeValue::S(id)) => id,
        Some(_) => {
            return Err(RepositoryError::MalformedDocument {
                collection: collection.to_string(),
                message: format!("attribute '{}' is not a string", id_attribute),
            })
        }
        None => {
            return Err(RepositoryError::MalformedDocument {
                collection: collection.to_string(),
                message: format!("missing '{}' attribute", id_attribute),
            })
        }
    };

    let data: Map<String, Value> = item
        .iter()
        .map(|(name, value)| (name.clone(), attribute_to_json(value)))
        .collect();

    Ok(MenuDocument::new(id, Value::Object(data)))
}

/// Convert a DynamoDB attribute to its natural JSON form
pub fn attribute_to_json(value: &AttributeValue) -> Value {
    match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => number_to_json(n),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::M(map) => Value::Object(
            map.iter()
                .map(|(name, value)| (name.clone(), attribute_to_json(value)))
                .collect(),
        ),
        AttributeValue::L(list) => Value::Array(list.iter().map(attribute_to_json).collect()),
        AttributeValue::Ss(strings) => {
            Value::Array(strings.iter().cloned().map(Value::String).collect())
        }
        AttributeValue::Ns(numbers) => {
            Value::Array(numbers.iter().map(|n| number_to_json(n)).collect())
        }
        AttributeValue::B(blob) => {
            Value::String(aws_smithy_types::base64::encode(blob.as_ref()))
        }
        AttributeValue::Bs(blobs) => Value::Array(
            blobs
                .iter()
                .map(|blob| Value::String(aws_smithy_types::base64::encode(blob.as_ref())))
                .collect(),
        ),
        other => {
            warn!("Unsupported DynamoDB attribute type: {:?}", other);
            Value::Null
        }
    }
}

// DynamoDB numbers carry up to 38 significant digits. A number becomes JSON
// only when an i64, u64 or f64 reproduces its text exactly; otherwise the
// string form is kept.
fn number_to_json(n: &str) -> Value {
    if let Ok(i) = n.parse::<i64>() {
        return Value::from(i);
    }
    if let Ok(u) = n.parse::<u64>() {
        return Value::from(u);
    }

    match n.parse::<f64>().ok().and_then(Number::from_f64) {
        Some(number) if number.to_string() == n => Value::Number(number),
        _ => Value::String(n.to_string()),
    }
}
