use anyhow::bail;
use schemars::{JsonSchema, Schema, schema_for};
use shelf_core::api::{
    CheckInRequest, CheckInResponse, CheckoutRequest, CheckoutResponse, ErrorResponse,
    ReserveRequest, ReserveResponse,
};
use shelf_core::entities::{Holding, Loan, Member, Reservation};
use shelf_core::workflow::WorkflowDefinition;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::SchemaArgs;
use crate::output::output;

const TYPE_NAMES: &[&str] = &[
    "reserve-request",
    "checkout-request",
    "checkin-request",
    "reserve-response",
    "checkout-response",
    "checkin-response",
    "error-response",
    "holding",
    "member",
    "reservation",
    "loan",
    "workflow",
];

fn schema_of<T: JsonSchema>() -> Schema {
    schema_for!(T)
}

fn lookup(type_name: &str) -> Option<Schema> {
    let schema = match type_name {
        "reserve-request" => schema_of::<ReserveRequest>(),
        "checkout-request" => schema_of::<CheckoutRequest>(),
        "checkin-request" => schema_of::<CheckInRequest>(),
        "reserve-response" => schema_of::<ReserveResponse>(),
        "checkout-response" => schema_of::<CheckoutResponse>(),
        "checkin-response" => schema_of::<CheckInResponse>(),
        "error-response" => schema_of::<ErrorResponse>(),
        "holding" => schema_of::<Holding>(),
        "member" => schema_of::<Member>(),
        "reservation" => schema_of::<Reservation>(),
        "loan" => schema_of::<Loan>(),
        "workflow" => schema_of::<WorkflowDefinition>(),
        _ => return None,
    };
    Some(schema)
}

/// Handle `shelf schema`.
pub fn handle(args: &SchemaArgs, flags: &GlobalFlags) -> anyhow::Result<()> {
    let type_name = args.type_name.trim().to_ascii_lowercase().replace('_', "-");
    if type_name == "list" {
        return output(&TYPE_NAMES, flags.format);
    }
    let Some(schema) = lookup(&type_name) else {
        bail!(
            "unknown schema type '{}'; expected one of: {}",
            args.type_name,
            TYPE_NAMES.join(", ")
        );
    };
    output(&schema, flags.format)
}

#[cfg(test)]
mod tests {
    use super::{TYPE_NAMES, lookup};

    #[test]
    fn every_listed_name_resolves() {
        for name in TYPE_NAMES {
            assert!(lookup(name).is_some(), "{name} has no schema");
        }
        assert!(lookup("invoice").is_none());
    }

    #[test]
    fn request_schema_uses_wire_field_names() {
        let schema = lookup("checkout-request").unwrap();
        let value = serde_json::to_value(&schema).unwrap();
        let props = value["properties"].as_object().unwrap();
        assert!(props.contains_key("memberIdentifier"));
        assert!(props.contains_key("manifestationIdentifiers"));
    }
}
